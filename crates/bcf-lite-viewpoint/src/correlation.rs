// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stable id <-> host element correlation
//!
//! Built over the elements currently visible in a view and rebuilt for
//! every inbound viewpoint, so element handles never outlive a request.

use bcf_lite_model::{Component, ElementId, ElementSource};
use rustc_hash::FxHashMap;

/// Bidirectional map between stable ids and host element handles
#[derive(Debug, Clone, Default)]
pub struct CorrelationIndex {
    by_stable_id: FxHashMap<String, ElementId>,
    by_element: FxHashMap<ElementId, String>,
}

impl CorrelationIndex {
    /// Index `elements` by their stable ids
    ///
    /// Elements without a stable id are left out. On duplicate ids the
    /// first element wins.
    pub fn build<S: ElementSource + ?Sized>(source: &S, elements: &[ElementId]) -> Self {
        let mut index = Self {
            by_stable_id: FxHashMap::default(),
            by_element: FxHashMap::default(),
        };
        index.by_stable_id.reserve(elements.len());
        index.by_element.reserve(elements.len());

        for &element in elements {
            let Some(stable_id) = source.stable_id(element) else {
                continue;
            };
            if index.by_stable_id.contains_key(&stable_id) {
                log::debug!("Duplicate stable id {} on element {}", stable_id, element);
                continue;
            }
            index.by_element.insert(element, stable_id.clone());
            index.by_stable_id.insert(stable_id, element);
        }

        index
    }

    /// Element with the given stable id
    pub fn resolve(&self, stable_id: &str) -> Option<ElementId> {
        self.by_stable_id.get(stable_id).copied()
    }

    /// Resolve components in order, dropping unknown ids
    pub fn resolve_all(&self, components: &[Component]) -> Vec<ElementId> {
        components
            .iter()
            .filter_map(|c| self.resolve(&c.stable_id))
            .collect()
    }

    /// Stable id of an indexed element
    pub fn stable_id_of(&self, element: ElementId) -> Option<&str> {
        self.by_element.get(&element).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_stable_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_stable_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bcf_lite_model::{Result, ViewId};

    struct Ids(Vec<(ElementId, Option<&'static str>)>);

    impl ElementSource for Ids {
        fn visible_elements(&self, _view: ViewId) -> Result<Vec<ElementId>> {
            Ok(self.0.iter().map(|(id, _)| *id).collect())
        }

        fn hidden_elements(&self, _view: ViewId) -> Result<Vec<ElementId>> {
            Ok(Vec::new())
        }

        fn stable_id(&self, element: ElementId) -> Option<String> {
            self.0
                .iter()
                .find(|(id, _)| *id == element)
                .and_then(|(_, guid)| guid.map(str::to_string))
        }

        fn selection(&self) -> Vec<ElementId> {
            Vec::new()
        }
    }

    fn source() -> Ids {
        Ids(vec![
            (ElementId(1), Some("guid-a")),
            (ElementId(2), Some("guid-b")),
            (ElementId(3), None),
            (ElementId(4), Some("guid-a")),
        ])
    }

    #[test]
    fn test_build_skips_missing_and_duplicates() {
        let ids = source();
        let elements = ids.visible_elements(ViewId(0)).unwrap();
        let index = CorrelationIndex::build(&ids, &elements);

        assert_eq!(index.len(), 2);
        assert_eq!(index.resolve("guid-a"), Some(ElementId(1)));
        assert_eq!(index.stable_id_of(ElementId(2)), Some("guid-b"));
        assert_eq!(index.stable_id_of(ElementId(4)), None);
    }

    #[test]
    fn test_unknown_ids_are_dropped() {
        let ids = source();
        let index = CorrelationIndex::build(&ids, &[ElementId(1), ElementId(2)]);

        let resolved = index.resolve_all(&[
            Component::with_stable_id("guid-b"),
            Component::with_stable_id("not-in-view"),
            Component::with_stable_id("guid-a"),
        ]);

        assert_eq!(resolved, vec![ElementId(2), ElementId(1)]);
    }

    #[test]
    fn test_only_given_elements_are_indexed() {
        let ids = source();
        let index = CorrelationIndex::build(&ids, &[ElementId(2)]);

        assert_eq!(index.resolve("guid-a"), None);
        assert!(!index.is_empty());
    }
}
