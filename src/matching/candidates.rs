use serde::{Deserialize, Serialize};

/// A halo/cluster pair that passed both search windows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub halo_index: usize,
    pub cluster_index: usize,

    /// Angular separation, degrees
    pub separation_deg: f64,

    /// Comoving transverse distance at the halo's redshift, Mpc.
    /// Only computed for physical windows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transverse_mpc: Option<f64>,

    /// Absolute redshift difference
    pub delta_z: f64,
}

/// Candidate partners of every object on one side of the match.
///
/// `partners(i)` lists, in ascending order, the indices on the other side
/// that object `i` has a candidate pair with. Every object gets an entry,
/// empty when it has no candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateTally {
    partners: Vec<Vec<usize>>,
}

impl CandidateTally {
    /// Build a tally for `len` objects from `(owner, partner)` pairs.
    ///
    /// Pairs whose owner is out of range are ignored.
    pub fn from_pairs(len: usize, pairs: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let mut partners = vec![Vec::new(); len];
        for (owner, partner) in pairs {
            if let Some(list) = partners.get_mut(owner) {
                list.push(partner);
            }
        }
        for list in &mut partners {
            list.sort_unstable();
            list.dedup();
        }
        Self { partners }
    }

    /// Number of objects on this side (with or without candidates)
    #[must_use]
    pub fn len(&self) -> usize {
        self.partners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }

    /// Candidate partners of object `index`; empty when out of range
    #[must_use]
    pub fn partners(&self, index: usize) -> &[usize] {
        self.partners.get(index).map_or(&[], Vec::as_slice)
    }

    /// `(index, partners)` for every object with at least one candidate
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> {
        self.partners
            .iter()
            .enumerate()
            .filter(|(_, list)| !list.is_empty())
            .map(|(i, list)| (i, list.as_slice()))
    }

    /// Objects with at least one candidate
    #[must_use]
    pub fn num_matched(&self) -> usize {
        self.partners.iter().filter(|list| !list.is_empty()).count()
    }

    /// Objects with more than one candidate
    #[must_use]
    pub fn num_ambiguous(&self) -> usize {
        self.partners.iter().filter(|list| list.len() > 1).count()
    }

    /// Total number of candidate pairs
    #[must_use]
    pub fn num_pairs(&self) -> usize {
        self.partners.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_sorted_partners() {
        let tally = CandidateTally::from_pairs(4, [(0, 5), (0, 2), (2, 1), (0, 2), (9, 0)]);
        assert_eq!(tally.len(), 4);
        assert_eq!(tally.partners(0), &[2, 5]);
        assert!(tally.partners(1).is_empty());
        assert_eq!(tally.partners(2), &[1]);
        assert!(tally.partners(42).is_empty());
        assert_eq!(tally.num_matched(), 2);
        assert_eq!(tally.num_ambiguous(), 1);
        assert_eq!(tally.num_pairs(), 3);
        assert_eq!(tally.iter().map(|(i, _)| i).collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn test_tally_serializes_as_nested_lists() {
        let tally = CandidateTally::from_pairs(3, [(1, 0), (1, 3)]);
        assert_eq!(serde_json::to_string(&tally).unwrap(), "[[],[0,3],[]]");
    }
}
