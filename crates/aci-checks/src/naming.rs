//! Interface identifier transforms.
//!
//! Port ids come off the fabric in short form (`eth1/33`). Discovery can
//! zero-pad the final port number so sibling services sort naturally, and
//! can expand the prefix to the long convention (`Ethernet1/33`). Checks
//! reverse both transforms to find the raw record for a service item.

/// Default width for port number padding.
pub const DEFAULT_PAD_WIDTH: usize = 3;

fn split_prefix(id: &str) -> (&str, &str) {
    let pos = id
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(id.len());
    id.split_at(pos)
}

/// Left-pads the final numeric segment with zeros to `width` characters.
/// Other segments and non-numeric tails are left untouched.
pub fn pad_interface_id(id: &str, width: usize) -> String {
    match id.rsplit_once('/') {
        Some((head, last))
            if !last.is_empty() && last.bytes().all(|b| b.is_ascii_digit()) =>
        {
            format!("{}/{:0>width$}", head, last, width = width)
        }
        _ => id.to_string(),
    }
}

/// Strips leading zeros from the final numeric segment; an all-zero
/// segment becomes `"0"`.
pub fn unpad_interface_id(id: &str) -> String {
    match id.rsplit_once('/') {
        Some((head, last))
            if !last.is_empty() && last.bytes().all(|b| b.is_ascii_digit()) =>
        {
            let trimmed = last.trim_start_matches('0');
            let segment = if trimmed.is_empty() { "0" } else { trimmed };
            format!("{}/{}", head, segment)
        }
        _ => id.to_string(),
    }
}

/// `eth1/33` -> `Ethernet1/33`; ids with any other prefix pass through.
pub fn long_interface_id(id: &str) -> String {
    let (prefix, rest) = split_prefix(id);
    if prefix.eq_ignore_ascii_case("eth") {
        format!("Ethernet{}", rest)
    } else {
        id.to_string()
    }
}

/// `Ethernet1/33` -> `eth1/33`; ids with any other prefix pass through.
pub fn short_interface_id(id: &str) -> String {
    let (prefix, rest) = split_prefix(id);
    if prefix.eq_ignore_ascii_case("ethernet") {
        format!("eth{}", rest)
    } else {
        id.to_string()
    }
}

/// Recovers the raw fabric id from a discovered service item by undoing
/// the long-name and padding transforms.
pub fn original_interface_id(item: &str) -> String {
    unpad_interface_id(&short_interface_id(item))
}

/// Digit count of the widest final segment across an item set. Discovery
/// pads every sibling to this width so names line up.
pub fn max_padding_width<'a>(ids: impl IntoIterator<Item = &'a str>) -> usize {
    ids.into_iter()
        .map(|id| {
            let last = id.rsplit('/').next().unwrap_or(id);
            last.chars().filter(|c| c.is_ascii_digit()).count()
        })
        .max()
        .unwrap_or(0)
}
