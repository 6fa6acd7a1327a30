use crate::codec::CodecKind;
use crate::{persist, DocId, Result, Term};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Term -> document ids containing it. Posting order is not significant.
pub type Postings = HashMap<Term, Vec<DocId>>;

/// Immutable word -> documents mapping answering conjunctive queries.
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    postings: Postings,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Wrap an arbitrary mapping, dropping duplicate ids and empty posting lists.
    pub fn from_postings(postings: Postings) -> Self {
        let postings = postings
            .into_iter()
            .filter_map(|(term, ids)| {
                let mut seen = HashSet::with_capacity(ids.len());
                let ids: Vec<DocId> = ids.into_iter().filter(|id| seen.insert(id.clone())).collect();
                (!ids.is_empty()).then_some((term, ids))
            })
            .collect();
        Self { postings }
    }

    /// Caller guarantees unique, non-empty posting lists.
    pub(crate) fn from_built(postings: Postings) -> Self {
        Self { postings }
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize { self.postings.len() }

    pub fn is_empty(&self) -> bool { self.postings.is_empty() }

    pub fn postings(&self, term: &str) -> Option<&[DocId]> {
        self.postings.get(term).map(Vec::as_slice)
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.postings.keys().map(String::as_str)
    }

    pub fn as_postings(&self) -> &Postings { &self.postings }

    pub fn into_postings(self) -> Postings { self.postings }

    /// Documents containing every term. An empty query matches nothing and an
    /// unknown term empties the result. Result order is unspecified.
    pub fn query<S: AsRef<str>>(&self, terms: &[S]) -> Vec<DocId> {
        if terms.is_empty() {
            return Vec::new();
        }
        let mut lists: Vec<&Vec<DocId>> = Vec::with_capacity(terms.len());
        for term in terms {
            match self.postings.get(term.as_ref()) {
                Some(ids) => lists.push(ids),
                None => return Vec::new(),
            }
        }
        // walk the shortest list, look ids up in the others
        lists.sort_by_key(|ids| ids.len());
        let shortest = lists[0];
        let rest: Vec<HashSet<&str>> = lists[1..]
            .iter()
            .map(|ids| ids.iter().map(String::as_str).collect())
            .collect();
        shortest
            .iter()
            .filter(|id| rest.iter().all(|set| set.contains(id.as_str())))
            .cloned()
            .collect()
    }

    pub fn dump<P: AsRef<Path>>(&self, path: P, codec: CodecKind) -> Result<()> {
        persist::save_postings(path.as_ref(), &self.postings, codec)
    }

    pub fn load<P: AsRef<Path>>(path: P, codec: CodecKind) -> Result<Self> {
        let postings = persist::load_postings(path.as_ref(), codec)?;
        Ok(Self { postings })
    }
}

/// Equal when both map the same terms to the same sets of documents.
impl PartialEq for InvertedIndex {
    fn eq(&self, other: &Self) -> bool {
        self.postings.len() == other.postings.len()
            && self.postings.iter().all(|(term, ids)| match other.postings.get(term) {
                Some(other_ids) => {
                    ids.len() == other_ids.len()
                        && ids.iter().collect::<HashSet<_>>() == other_ids.iter().collect::<HashSet<_>>()
                }
                None => false,
            })
    }
}

impl Eq for InvertedIndex {}
