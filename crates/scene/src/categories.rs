use crate::state::ApplicationState;

/// Domain indices grouped by category, in domain order.
///
/// A domain appears once under every category it lists. Category indices a
/// domain names that have no matching selector are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryIndex {
    members: Vec<Vec<usize>>,
}

impl CategoryIndex {
    pub fn build(state: &ApplicationState) -> Self {
        let mut members = vec![Vec::new(); state.domain_selectors.len()];
        for (domain_index, domain) in state.model.domains.iter().enumerate() {
            for &cat in &domain.categories {
                if let Some(list) = members.get_mut(cat) {
                    list.push(domain_index);
                }
            }
        }
        Self { members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self, category: usize) -> &[usize] {
        self.members.get(category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> + '_ {
        self.members
            .iter()
            .enumerate()
            .map(|(idx, list)| (idx, list.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::CategoryIndex;
    use crate::state::tests::sample_state;

    #[test]
    fn groups_domains_by_category() {
        let s = sample_state();
        let idx = CategoryIndex::build(&s);
        assert_eq!(idx.len(), 2);
        assert_eq!(idx.members(0), &[0, 1]);
        assert_eq!(idx.members(1), &[1, 2]);
        assert!(idx.members(7).is_empty());
    }

    #[test]
    fn unknown_categories_are_ignored() {
        let mut s = sample_state();
        s.model.domains[0].categories.insert(9);
        let idx = CategoryIndex::build(&s);
        let total: usize = idx.iter().map(|(_, m)| m.len()).sum();
        assert_eq!(total, 4);
    }
}
