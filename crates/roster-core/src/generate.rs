#![forbid(unsafe_code)]

//! Deterministic synthetic customer generator.
//!
//! Produces plausible-looking customers from a seed so tests and demos can
//! build a large [`RecordSource`] without fixtures. Equal configs produce
//! equal datasets, record for record.

use time::Duration as TimeDuration;

use crate::avatar::{AvatarProvider, InitialsAvatars};
use crate::config::GeneratorConfig;
use crate::record::{MAX_SCORE, Record, RecordId};
use crate::source::RecordSource;

const FIRST_NAMES: &[&str] = &[
    "Aaliyah", "Abel", "Ada", "Adrian", "Aisha", "Alan", "Alice", "Amara", "Andre", "Anika",
    "Arjun", "Aurora", "Beatrice", "Benjamin", "Bianca", "Brandon", "Caleb", "Camila", "Carlos",
    "Chloe", "Dalia", "Daniel", "Delphine", "Diego", "Elena", "Elias", "Emeka", "Emma", "Farah",
    "Felix", "Fiona", "Gabriel", "Grace", "Hana", "Hector", "Ingrid", "Isaac", "Ivy", "Jamal",
    "Jasmine", "Jonas", "Julia", "Kai", "Keiko", "Lars", "Layla", "Leon", "Lucia", "Malik",
    "Maya", "Mateo", "Nadia", "Naveen", "Nora", "Olivia", "Omar", "Priya", "Quentin", "Rafael",
    "Rosa", "Samuel", "Sofia", "Tariq", "Thea", "Uma", "Victor", "Wanda", "Xavier", "Yara",
    "Yusuf", "Zara", "Zoe",
];

const LAST_NAMES: &[&str] = &[
    "Abbott", "Adeyemi", "Alvarez", "Anderson", "Bauer", "Becker", "Bishop", "Brennan", "Castillo",
    "Chen", "Cohen", "Dagher", "Dubois", "Eriksen", "Fischer", "Flores", "Garcia", "Gupta",
    "Hansen", "Harris", "Ibrahim", "Ivanova", "Jensen", "Johnson", "Kaur", "Kowalski", "Larsen",
    "Lee", "Lopez", "Moreau", "Murphy", "Nakamura", "Nguyen", "Novak", "Okafor", "Olsen",
    "Patel", "Petrov", "Quinn", "Ramirez", "Rossi", "Santos", "Schmidt", "Silva", "Tanaka",
    "Thompson", "Ueda", "Vargas", "Walker", "Weber", "Xu", "Yamamoto", "Young", "Zhang",
];

const EMAIL_DOMAINS: &[&str] = &["gmail.com", "yahoo.com", "hotmail.com", "example.org"];

const PHONE_FORMATS: &[&str] = &[
    "###-###-####",
    "(###) ###-####",
    "1-###-###-####",
    "###.###.####",
    "###-###-#### x###",
    "(###) ###-#### x####",
];

const SECONDS_PER_YEAR: u64 = 365 * 24 * 60 * 60;

/// Simple LCG PRNG for deterministic generation.
#[derive(Debug, Clone)]
struct SeededRng {
    state: u64,
}

impl SeededRng {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        // LCG parameters from Numerical Recipes
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        // High bits have the longest period.
        self.state >> 33
    }

    /// Uniform value in `min..max` (`min` when the range is empty).
    fn next_range(&mut self, min: u64, max: u64) -> u64 {
        if max <= min {
            return min;
        }
        min + (self.next_u64() % (max - min))
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.next_range(0, items.len() as u64) as usize]
    }
}

/// Generates customer records from a [`GeneratorConfig`].
#[derive(Debug, Clone)]
pub struct Generator<A = InitialsAvatars> {
    config: GeneratorConfig,
    avatars: A,
}

impl Generator<InitialsAvatars> {
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            avatars: InitialsAvatars,
        }
    }
}

impl<A: AvatarProvider> Generator<A> {
    /// Use a different avatar collaborator.
    #[must_use]
    pub fn with_avatars<B: AvatarProvider>(self, avatars: B) -> Generator<B> {
        Generator {
            config: self.config,
            avatars,
        }
    }

    /// Generate all records. Ids run from 1 to `count`.
    #[must_use]
    pub fn generate(&self) -> Vec<Record> {
        let count = self.config.count;
        crate::info!(count, seed = self.config.seed, "generating records");

        let mut rng = SeededRng::new(self.config.seed);
        let records: Vec<Record> = (0..count)
            .map(|idx| self.record(&mut rng, idx as u64 + 1))
            .collect();

        crate::info!(count = records.len(), "record generation complete");
        records
    }

    /// Generate all records straight into a [`RecordSource`].
    #[must_use]
    pub fn build_source(&self) -> RecordSource {
        RecordSource::new(self.generate())
    }

    fn record(&self, rng: &mut SeededRng, id: u64) -> Record {
        let first = rng.pick(FIRST_NAMES);
        let last = rng.pick(LAST_NAMES);
        let name = format!("{first} {last}");
        let phone = phone_number(rng);
        let email = email(rng, first, last);
        let score = rng.next_range(0, u64::from(MAX_SCORE) + 1) as u8;
        let age_secs = rng.next_range(0, SECONDS_PER_YEAR) as i64;
        let last_message_at = self.config.reference_time - TimeDuration::seconds(age_secs);
        let added_by = format!("{} {}", rng.pick(FIRST_NAMES), rng.pick(LAST_NAMES));
        let avatar = self.avatars.avatar_for(&name);

        Record {
            id: RecordId(id),
            name,
            phone,
            email,
            score,
            last_message_at,
            added_by,
            avatar,
        }
    }
}

/// Generate a [`RecordSource`] with the given configuration.
#[must_use]
pub fn generate_source(config: GeneratorConfig) -> RecordSource {
    Generator::new(config).build_source()
}

fn phone_number(rng: &mut SeededRng) -> String {
    let format = rng.pick(PHONE_FORMATS);
    format
        .chars()
        .map(|ch| {
            if ch == '#' {
                char::from(b'0' + rng.next_range(0, 10) as u8)
            } else {
                ch
            }
        })
        .collect()
}

fn email(rng: &mut SeededRng, first: &str, last: &str) -> String {
    let domain = rng.pick(EMAIL_DOMAINS);
    let local = match rng.next_range(0, 3) {
        0 => format!("{first}.{last}"),
        1 => format!("{first}_{last}{}", rng.next_range(0, 100)),
        _ => format!("{first}{}", rng.next_range(0, 1000)),
    };
    format!("{local}@{domain}").to_lowercase()
}
