struct RefKeys {
    entries: Vec<bool>,
}

impl RefKeys {
    fn new(capacity: usize) -> RefKeys {
        RefKeys {
            entries: vec![false; capacity],
        }
    }

    fn contains(&self, key: i64) -> bool {
        self.entries[key as usize]
    }

    fn len(&self) -> usize {
        self.entries.iter().filter(|present| **present).count()
    }

    fn iter(&self) -> std::vec::IntoIter<i64> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(key, present)| if *present { Some(key as i64) } else { None })
            .collect::<Vec<i64>>()
            .into_iter()
    }

    // return true if key was not present.
    fn insert(&mut self, key: i64) -> bool {
        let entry = &mut self.entries[key as usize];
        let fresh = !*entry;
        *entry = true;
        fresh
    }

    // return true if key was present.
    fn remove(&mut self, key: i64) -> bool {
        let entry = &mut self.entries[key as usize];
        let present = *entry;
        *entry = false;
        present
    }
}
