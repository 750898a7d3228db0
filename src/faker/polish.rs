//! Word lists for the `pl_PL` locale, which the `fake` crate does not ship.

use rand::Rng;
use rand::rngs::StdRng;

const MALE_FIRST: &[&str] = &[
    "Adam", "Andrzej", "Bartłomiej", "Dawid", "Grzegorz", "Jakub", "Jan", "Kamil", "Krzysztof",
    "Łukasz", "Marcin", "Michał", "Paweł", "Piotr", "Tomasz", "Wojciech", "Zbigniew",
];

const FEMALE_FIRST: &[&str] = &[
    "Agnieszka", "Anna", "Barbara", "Ewa", "Joanna", "Katarzyna", "Magdalena", "Małgorzata",
    "Monika", "Natalia", "Paulina", "Zofia", "Żaneta",
];

/// Surnames as (masculine, feminine) forms.
const SURNAMES: &[(&str, &str)] = &[
    ("Nowak", "Nowak"),
    ("Kowalski", "Kowalska"),
    ("Wiśniewski", "Wiśniewska"),
    ("Wójcik", "Wójcik"),
    ("Kowalczyk", "Kowalczyk"),
    ("Kamiński", "Kamińska"),
    ("Lewandowski", "Lewandowska"),
    ("Zieliński", "Zielińska"),
    ("Szymański", "Szymańska"),
    ("Woźniak", "Woźniak"),
    ("Dąbrowski", "Dąbrowska"),
    ("Kozłowski", "Kozłowska"),
    ("Mazur", "Mazur"),
    ("Krawczyk", "Krawczyk"),
];

const COMPANY_WORDS: &[&str] = &[
    "budmax", "transpol", "agrotech", "polsoft", "mediapol", "energix", "kraktrans", "wisla",
    "mazowsze", "baltyk", "tatry", "sudety", "warta", "notec", "mostostal", "elbud",
];

const DOMAIN_SUFFIXES: &[&str] = &["pl", "com.pl", "net.pl", "eu", "com"];

const FREE_EMAIL: &[&str] = &[
    "wp.pl",
    "onet.pl",
    "interia.pl",
    "o2.pl",
    "op.pl",
    "gazeta.pl",
    "poczta.fm",
    "gmail.com",
];

const SUBJECTS: &[&str] = &[
    "Faktura za bieżący miesiąc",
    "Potwierdzenie zamówienia",
    "Spotkanie w przyszłym tygodniu",
    "Aktualizacja danych kontaktowych",
    "Przypomnienie o płatności",
    "Oferta współpracy",
    "Raport kwartalny",
    "Zmiana harmonogramu dostaw",
    "Prośba o informację zwrotną",
    "Zaproszenie na szkolenie",
];

const OPENINGS: &[&str] = &[
    "Dzień dobry,",
    "Szanowni Państwo,",
    "Witam serdecznie,",
    "Cześć,",
];

const SENTENCES: &[&str] = &[
    "W załączeniu przesyłam dokumenty, o które Państwo prosili.",
    "Proszę o potwierdzenie otrzymania tej wiadomości.",
    "Termin realizacji został przesunięty o kilka dni.",
    "Uprzejmie informujemy o zmianie numeru rachunku bankowego.",
    "Spotkanie odbędzie się w sali konferencyjnej na drugim piętrze.",
    "Wszystkie szczegóły znajdą Państwo w naszym systemie.",
    "Dziękujemy za dotychczasową współpracę.",
    "W razie pytań pozostaję do dyspozycji.",
    "Prosimy o uregulowanie należności w ciągu siedmiu dni.",
    "Zamówienie zostało przekazane do realizacji.",
    "Najnowsza wersja raportu jest już dostępna.",
    "Zależy nam na szybkiej odpowiedzi.",
];

const CLOSINGS: &[&str] = &["Pozdrawiam serdecznie.", "Z poważaniem.", "Do usłyszenia."];

fn pick(rng: &mut StdRng, items: &[&'static str]) -> &'static str {
    items[rng.gen_range(0..items.len())]
}

pub fn name(rng: &mut StdRng) -> String {
    let (masculine, feminine) = SURNAMES[rng.gen_range(0..SURNAMES.len())];
    if rng.gen_bool(0.5) {
        format!("{} {}", pick(rng, MALE_FIRST), masculine)
    } else {
        format!("{} {}", pick(rng, FEMALE_FIRST), feminine)
    }
}

pub fn user_name(rng: &mut StdRng) -> String {
    let (surname, _) = SURNAMES[rng.gen_range(0..SURNAMES.len())];
    let firsts = if rng.gen_bool(0.5) { MALE_FIRST } else { FEMALE_FIRST };
    let first = pick(rng, firsts);
    let (first, surname) = (fold_ascii(first), fold_ascii(surname));
    match rng.gen_range(0..3) {
        0 => format!("{first}.{surname}"),
        1 => format!("{}{surname}", &first[..1]),
        _ => format!("{surname}{}", rng.gen_range(10..100)),
    }
}

pub fn domain_name(rng: &mut StdRng) -> String {
    format!("{}.{}", pick(rng, COMPANY_WORDS), pick(rng, DOMAIN_SUFFIXES))
}

pub fn free_email_domain(rng: &mut StdRng) -> String {
    pick(rng, FREE_EMAIL).to_string()
}

pub fn subject(rng: &mut StdRng) -> String {
    pick(rng, SUBJECTS).to_string()
}

/// Paragraphs of a short business letter: greeting, body, sign-off.
pub fn paragraphs(rng: &mut StdRng, count: usize) -> Vec<String> {
    let mut out = vec![pick(rng, OPENINGS).to_string()];
    for _ in 0..count {
        let len = rng.gen_range(2..5);
        let sentences: Vec<&str> = (0..len).map(|_| pick(rng, SENTENCES)).collect();
        out.push(sentences.join(" "));
    }
    out.push(pick(rng, CLOSINGS).to_string());
    out
}

/// Lowercase ASCII transliteration of Polish diacritics.
pub fn fold_ascii(word: &str) -> String {
    word.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'ą' => 'a',
            'ć' => 'c',
            'ę' => 'e',
            'ł' => 'l',
            'ń' => 'n',
            'ó' => 'o',
            'ś' => 's',
            'ź' | 'ż' => 'z',
            other => other,
        })
        .filter(char::is_ascii_alphanumeric)
        .collect()
}
