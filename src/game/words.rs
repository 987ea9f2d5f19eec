//! Word source - shuffled batches of target words

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Built-in dictionary of everyday Finnish words
pub const DICTIONARY: &[&str] = &[
    "kissa", "koira", "kala", "talo", "auto", "puu", "kukka", "aurinko", "kuu", "tähti",
    "meri", "järvi", "joki", "metsä", "vuori", "saari", "ranta", "tie", "katu", "kylä",
    "kaupunki", "koulu", "kirja", "kynä", "paperi", "pöytä", "tuoli", "sänky", "ikkuna", "ovi",
    "lattia", "katto", "seinä", "lamppu", "kello", "puhelin", "tietokone", "näyttö", "hiiri", "näppäin",
    "leipä", "maito", "juusto", "voi", "muna", "liha", "peruna", "porkkana", "omena", "banaani",
    "appelsiini", "mansikka", "mustikka", "puolukka", "sieni", "kahvi", "tee", "vesi", "mehu", "sokeri",
    "suola", "pippuri", "keitto", "puuro", "kakku", "pulla", "keksi", "jäätelö", "suklaa", "karkki",
    "äiti", "isä", "sisko", "veli", "mummo", "vaari", "ystävä", "naapuri", "opettaja", "lääkäri",
    "poliisi", "kokki", "kuljettaja", "myyjä", "taiteilija", "laulaja", "soittaja", "urheilija", "pelaaja", "voittaja",
    "pallo", "maila", "luistin", "suksi", "pyörä", "vene", "laiva", "juna", "bussi", "lentokone",
    "raitiovaunu", "silta", "tunneli", "asema", "satama", "kenttä", "puisto", "tori", "kauppa", "pankki",
    "posti", "kirjasto", "museo", "teatteri", "elokuva", "musiikki", "laulu", "tanssi", "peli", "leikki",
    "lumi", "jää", "sade", "tuuli", "myrsky", "pilvi", "taivas", "sumu", "salama", "ukkonen",
    "kevät", "kesä", "syksy", "talvi", "aamu", "päivä", "ilta", "yö", "viikko", "kuukausi",
    "vuosi", "hetki", "minuutti", "tunti", "sekunti", "maanantai", "tiistai", "keskiviikko", "torstai", "perjantai",
    "lauantai", "sunnuntai", "punainen", "sininen", "vihreä", "keltainen", "musta", "valkoinen", "harmaa", "ruskea",
    "iso", "pieni", "pitkä", "lyhyt", "nopea", "hidas", "kuuma", "kylmä", "uusi", "vanha",
    "hyvä", "paha", "kaunis", "vahva", "heikko", "iloinen", "surullinen", "väsynyt", "nälkäinen", "janoinen",
    "juosta", "kävellä", "hypätä", "uida", "lentää", "ajaa", "istua", "seistä", "maata", "nukkua",
    "syödä", "juoda", "lukea", "kirjoittaa", "laskea", "piirtää", "maalata", "rakentaa", "korjata", "siivota",
    "pestä", "kokata", "leipoa", "ostaa", "myydä", "antaa", "ottaa", "tuoda", "viedä", "etsiä",
    "löytää", "avata", "sulkea", "aloittaa", "lopettaa", "odottaa", "auttaa", "kysyä", "vastata", "kertoa",
    "karhu", "susi", "kettu", "jänis", "orava", "hirvi", "poro", "lintu", "varis", "pöllö",
    "kotka", "joutsen", "sorsa", "ahven", "hauki", "lohi", "sammakko", "käärme", "muurahainen", "perhonen",
    "mehiläinen", "hämähäkki", "hevonen", "lehmä", "lammas", "sika", "kana", "kukko", "vuohi", "siili",
];

/// Supplies randomly ordered words for a game session
#[derive(Debug, Clone)]
pub struct WordSource {
    dictionary: Vec<String>,
    rng: ChaCha8Rng,
}

impl WordSource {
    /// Word source over the built-in dictionary
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_dictionary(DICTIONARY.iter().map(|w| w.to_string()).collect(), seed)
    }

    /// Word source over a custom dictionary
    pub fn with_dictionary(dictionary: Vec<String>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self { dictionary, rng }
    }

    pub fn dictionary_len(&self) -> usize {
        self.dictionary.len()
    }

    /// Draw a fresh shuffle of up to `n` words.
    ///
    /// Never repeats a dictionary position within one call, so the batch is
    /// capped at the dictionary size.
    pub fn next_batch(&mut self, n: usize) -> Vec<String> {
        self.dictionary
            .choose_multiple(&mut self.rng, n.min(self.dictionary.len()))
            .cloned()
            .collect()
    }
}

impl Default for WordSource {
    fn default() -> Self {
        Self::new(None)
    }
}
