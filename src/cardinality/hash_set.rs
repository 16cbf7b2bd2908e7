use crate::cardinality::Cardinality;
use std::collections::HashSet;

impl Cardinality for HashSet<String> {
    fn count(&self) -> f64 {
        self.len() as f64
    }

    fn insert(&mut self, item: &str) {
        if !self.contains(item) {
            HashSet::insert(self, item.to_owned());
        }
    }
}
