// src/poolparse.rs
// NCVEC plain-text question pools -> the JSON shape `PoolCache` serves

use std::collections::BTreeSet;

use anyhow::{bail, ensure, Context, Result};
use regex::Regex;
use tracing::debug;

use crate::pools::{Question, QuestionPool};

pub const POOL_JSON_VERSION: u32 = 1;

/// Questions per element in the current pools.
pub const QUESTION_COUNTS: [(char, usize); 3] = [
    ('T', 426),
    ('G', 456),
    ('E', 701), // one withdrawn from 702
];

/// Pool files come as Windows-1252 (sometimes re-saved as UTF-8). Either way
/// the result has LF line endings and plain ASCII dashes, quotes and spaces.
pub fn decode_pool_text(raw: &[u8]) -> String {
    let text: String = match std::str::from_utf8(raw) {
        Ok(s) => s.to_owned(),
        Err(_) => raw.iter().map(|&b| cp1252_char(b)).collect(),
    };
    text.replace("\r\n", "\n").chars().map(fold_punctuation).collect()
}

fn cp1252_char(b: u8) -> char {
    match b {
        0x92 => '\u{2019}',
        0x93 => '\u{201c}',
        0x94 => '\u{201d}',
        0x96 => '\u{2013}',
        // the rest of what shows up in the pools is Latin-1
        _ => b as char,
    }
}

fn fold_punctuation(c: char) -> char {
    match c {
        '\u{2013}' => '-',
        '\u{00a0}' => ' ',
        '\u{2019}' => '\'',
        '\u{201c}' | '\u{201d}' => '"',
        other => other,
    }
}

pub struct PoolParser {
    subelement: Regex,
    topic: Regex,
    question: Regex,
}

impl PoolParser {
    pub fn new() -> Result<Self> {
        let subelement = Regex::new(r"(?m)^SUBELEMENT (?P<number>[TGE]\d+) . (?P<description>.*?)$")
            .context("subelement pattern")?;
        let topic = Regex::new(r"(?m)^(?P<number>[TGE]\d+[A-Z]+)( -)? (?P<description>.*?)$")
            .context("topic pattern")?;
        // citations are sometimes missing, or missing their closing bracket
        let question = Regex::new(concat!(
            r"(?m)^(?P<topic>[TGE]\d+[A-Z]+)(?P<number>\d+) ",
            r"\((?P<correct>[A-D])\)",
            r"( \[(?P<citation>.*?)\]?)?\s*?\n",
            r"(?P<question>.*?)\n",
            r"A\. (?P<a>.*?)\n",
            r"B\. (?P<b>.*?)\n",
            r"C\. (?P<c>.*?)\n",
            r"D\. (?P<d>.*?)$",
        ))
        .context("question pattern")?;
        Ok(Self {
            subelement,
            topic,
            question,
        })
    }

    /// `text` should already be through `decode_pool_text`.
    pub fn parse(&self, text: &str) -> QuestionPool {
        let mut pool = QuestionPool {
            version: POOL_JSON_VERSION,
            ..QuestionPool::default()
        };

        for c in self.subelement.captures_iter(text) {
            pool.subelements
                .insert(c["number"].to_owned(), c["description"].to_owned());
        }
        for c in self.topic.captures_iter(text) {
            pool.topics
                .insert(c["number"].to_owned(), c["description"].to_owned());
        }
        for c in self.question.captures_iter(text) {
            let answers = [("A", "a"), ("B", "b"), ("C", "c"), ("D", "d")]
                .into_iter()
                .map(|(letter, group)| (letter.to_owned(), c[group].to_owned()))
                .collect();
            let q = Question {
                topic: c["topic"].to_owned(),
                number: c["number"].to_owned(),
                correct: c["correct"].to_owned(),
                citation: c.name("citation").map(|m| m.as_str().to_owned()),
                question: c["question"].to_owned(),
                answers,
            };
            pool.questions.insert(format!("{}{}", q.topic, q.number), q);
        }

        debug!(
            subelements = pool.subelements.len(),
            topics = pool.topics.len(),
            questions = pool.questions.len(),
            "parsed question pool text"
        );
        pool
    }
}

fn elements_of<'a>(keys: impl Iterator<Item = &'a String>) -> BTreeSet<char> {
    keys.filter_map(|k| k.chars().next()).collect()
}

/// Checks a freshly parsed pool against `QUESTION_COUNTS` and returns its
/// element letter.
pub fn sanity_check(pool: &QuestionPool) -> Result<char> {
    check_counts(pool, &QUESTION_COUNTS)
}

/// Everything must belong to one element, and that element must have exactly
/// the expected number of questions.
pub fn check_counts(pool: &QuestionPool, expected: &[(char, usize)]) -> Result<char> {
    let elements = elements_of(pool.subelements.keys());
    let (Some(&element), 1) = (elements.first(), elements.len()) else {
        bail!("subelements must come from exactly one element, found {elements:?}");
    };
    let only = BTreeSet::from([element]);
    ensure!(
        elements_of(pool.topics.keys()) == only,
        "topics are not all in element {element}"
    );
    ensure!(
        elements_of(pool.questions.keys()) == only,
        "questions are not all in element {element}"
    );

    let want = expected
        .iter()
        .find(|(e, _)| *e == element)
        .map(|(_, n)| *n)
        .with_context(|| format!("no expected question count for element {element}"))?;
    ensure!(
        pool.questions.len() == want,
        "element {element}: parsed {} questions, expected {want}",
        pool.questions.len()
    );
    Ok(element)
}
