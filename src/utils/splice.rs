/// Concatenates `fragments` in order, with no separator between them.
pub fn splice_str(fragments: &[&str]) -> String {
    let len = fragments.iter().map(|f| f.len()).sum();
    let mut out = String::with_capacity(len);
    for fragment in fragments {
        out.push_str(fragment);
    }
    out
}
