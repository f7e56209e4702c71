// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Peter Carlton

// Transforms that rewrite ids and descriptions. The description conventionally starts with the
// id; these either keep it that way or clear the description.

use regex::{Regex, RegexBuilder};

use crate::errors::Result;
use crate::seq::record::SeqRecord;
use crate::transform::map_records;

pub fn name_append_suffix<I>(records: I, suffix: &str) -> impl Iterator<Item = Result<SeqRecord>>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    let suffix = suffix.to_string();
    map_records(records, move |mut rec| {
        let new_id = format!("{}{}", rec.id, suffix);
        rec.rename(new_id);
        Ok(rec)
    })
}

pub fn name_insert_prefix<I>(records: I, prefix: &str) -> impl Iterator<Item = Result<SeqRecord>>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    let prefix = prefix.to_string();
    map_records(records, move |mut rec| {
        let new_id = format!("{}{}", prefix, rec.id);
        rec.rename(new_id);
        Ok(rec)
    })
}

/// Case-insensitive regex, as used by all the pattern-based transforms.
pub fn case_insensitive(pattern: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(pattern).case_insensitive(true).build()?)
}

// Accepts `\1`-style group references on top of the regex crate's own `$1` / `${name}`.
fn replacement_template(replace: &str) -> String {
    let backref = Regex::new(r"\\(\d+)").expect("static regex");
    backref.replace_all(replace, "$${${1}}").into_owned()
}

/// Substitutes every (case-insensitive) match of `search` in id and description, independently.
pub fn name_replace<I>(
    records: I,
    search: &str,
    replace: &str,
) -> Result<impl Iterator<Item = Result<SeqRecord>>>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    let regex = case_insensitive(search)?;
    let template = replacement_template(replace);
    Ok(map_records(records, move |mut rec| {
        rec.id = regex.replace_all(&rec.id, template.as_str()).into_owned();
        rec.description = regex
            .replace_all(&rec.description, template.as_str())
            .into_owned();
        Ok(rec)
    }))
}

/// Keeps only the id: if the description holds anything beyond a single word, it is cleared.
pub fn first_name_capture<I>(records: I) -> impl Iterator<Item = Result<SeqRecord>>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    map_records(records, |mut rec| {
        if rec.description.contains(char::is_whitespace) {
            rec.description.clear();
        }
        Ok(rec)
    })
}

/// Cuts trailing `/<start>-<stop>` ranges off ids, when `start` is positive and not past `stop`.
/// The description is cleared whether or not the id had a range.
pub fn strip_range<I>(records: I) -> impl Iterator<Item = Result<SeqRecord>>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    // Greedy: with several ranges only the last one goes.
    let cut_regex = Regex::new(r"^(?P<id>.*)/(?P<start>\d+)-(?P<stop>\d+)").expect("static regex");
    map_records(records, move |mut rec| {
        let stripped = cut_regex.captures(&rec.id).and_then(|caps| {
            let start = caps["start"].parse::<u64>().ok()?;
            let stop = caps["stop"].parse::<u64>().ok()?;
            (start > 0 && start <= stop).then(|| caps["id"].to_string())
        });
        if let Some(id) = stripped {
            rec.id = id;
        }
        rec.description.clear();
        Ok(rec)
    })
}
