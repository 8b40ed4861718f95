//! Roster page extraction and value cleaning.

pub mod normalize;
pub mod parser;

pub use normalize::normalize;
pub use parser::{RosterParser, RosterRow};

/// Minimal roster page whose rows put the name at cell 3 and the value at cell 7.
#[cfg(test)]
pub(crate) fn roster_page(rows: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (name, value) in rows {
        body.push_str(&format!(
            "<tr><td>1</td><td><table class=\"inline-table\"><tr>\
             <td><img alt=\"{name}\"></td><td>{name}</td></tr>\
             <tr><td>Forward</td></tr></table></td>\
             <td>Jan 1, 2000</td><td><img alt=\"Nation\"></td>\
             <td>{value}</td></tr>"
        ));
    }
    format!(
        "<html><body><table class=\"items\"><thead><tr><th>#</th></tr></thead>\
         <tbody>{body}</tbody></table></body></html>"
    )
}
