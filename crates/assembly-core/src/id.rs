use slotmap::new_key_type;

new_key_type! {
    /// Identifies a machine within one graph generation.
    ///
    /// Keys are only meaningful in the graph that issued them; a rebuild
    /// issues fresh keys.
    pub struct MachineId;
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn ids_from_separate_maps_do_not_resolve_across() {
        let mut a: SlotMap<MachineId, u8> = SlotMap::with_key();
        let b: SlotMap<MachineId, u8> = SlotMap::with_key();
        let id = a.insert(1);
        assert!(a.contains_key(id));
        assert!(!b.contains_key(id));
    }

    #[test]
    fn ids_are_hashable() {
        use std::collections::HashMap;
        let mut map: SlotMap<MachineId, ()> = SlotMap::with_key();
        let id = map.insert(());
        let mut names = HashMap::new();
        names.insert(id, "drill");
        assert_eq!(names[&id], "drill");
    }
}
