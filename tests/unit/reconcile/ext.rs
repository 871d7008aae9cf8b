use super::*;
use crate::scene::element::Element;

#[test]
fn rows_follow_element_lifetime() {
    let mut s = Storage::new();
    let a = s.insert(Element::group());
    let b = s.insert(Element::group());
    let mut ext = ExtTable::new();
    ext.insert(a, 3usize);
    *ext.entry_or_default(b) += 7;
    assert_eq!(ext.get(b), Some(&7));
    assert_eq!(ext.insert(a, 4), Some(3));
    assert_eq!(ext.len(), 2);

    s.destroy(a);
    assert_eq!(ext.prune(&s), 1);
    assert!(!ext.contains(a));
    assert_eq!(ext.iter().collect::<Vec<_>>(), vec![(b, &7)]);
}

#[test]
fn detached_elements_keep_their_rows() {
    let mut s = Storage::new();
    let g = s.insert(Element::group());
    let child = s.insert(Element::group());
    s.add_root(g);
    s.add_child(g, child);
    let mut ext = ExtTable::new();
    ext.insert(child, "datum-0");
    s.remove_child(g, child);
    assert_eq!(ext.prune(&s), 0);
    assert_eq!(ext.remove(child), Some("datum-0"));
    assert!(ext.is_empty());
}
