use docpipe::infrastructure::text_processing::{LINKS_SECTION_HEADER, append_links_section};

#[test]
fn given_repeated_links_when_appending_then_each_listed_once_in_order() {
    let text = "Portfolio: https://ada.dev. Code at https://github.com/ada and https://ada.dev";

    let out = append_links_section(text);

    assert!(out.ends_with(&format!(
        "{LINKS_SECTION_HEADER}\nhttps://ada.dev\nhttps://github.com/ada"
    )));
}

#[test]
fn given_text_without_links_when_appending_then_unchanged() {
    assert_eq!(append_links_section("no links here"), "no links here");
}
