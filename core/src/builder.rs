use crate::{Document, InvertedIndex, Postings};
use std::collections::{HashMap, HashSet};

/// Build an index from raw document lines. Blank lines are skipped.
pub fn build_inverted_index<I, S>(documents: I) -> InvertedIndex
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut postings_raw: HashMap<String, HashSet<String>> = HashMap::new();
    let mut num_docs = 0usize;
    let mut skipped = 0usize;

    for line in documents {
        let Some(doc) = Document::parse(line.as_ref()) else {
            skipped += 1;
            continue;
        };
        num_docs += 1;
        for term in doc.terms() {
            match postings_raw.get_mut(term) {
                Some(ids) => {
                    ids.insert(doc.id.to_string());
                }
                None => {
                    postings_raw.insert(term.to_string(), HashSet::from([doc.id.to_string()]));
                }
            }
        }
    }
    if skipped > 0 {
        tracing::debug!(skipped, "skipped blank document lines");
    }

    let postings: Postings = postings_raw
        .into_iter()
        .map(|(term, ids)| (term, ids.into_iter().collect()))
        .collect();
    tracing::info!(num_docs, num_terms = postings.len(), "built inverted index");
    InvertedIndex::from_built(postings)
}
