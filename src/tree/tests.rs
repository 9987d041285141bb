use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::{
    html::{TagDescriptor, TagFlags, TagRegistry},
    parser::{Attributes, BBParser},
    tree::{ParseNode, ParseTree},
};

fn registry() -> TagRegistry {
    [
        TagDescriptor::new("b"),
        TagDescriptor::new("i"),
        TagDescriptor::new("url"),
        TagDescriptor::new("code").with_flags(TagFlags::default() | TagFlags::NO_NESTING),
        TagDescriptor::new("plain").with_flags(TagFlags::INSERT_LINE_BREAKS),
    ]
    .into_iter()
    .collect()
}

fn tag<'a>(name: &'a str, children: Vec<ParseNode<'a>>) -> ParseNode<'a> {
    ParseNode::Tag {
        name,
        attributes: Attributes::new(),
        children,
    }
}

#[test]
pub fn text_only() {
    let tree = ParseTree::build("hello", &registry());
    assert!(tree.is_valid());
    assert_eq!(tree.sub_trees(), &[ParseNode::Text("hello")]);
}

#[test]
pub fn empty_input() {
    let tree = ParseTree::build("", &registry());
    assert!(tree.is_valid());
    assert!(tree.sub_trees().is_empty());
}

#[test]
pub fn nested_tags() {
    let tree = ParseTree::build("a[b]x[i]y[/i][/b]z", &registry());
    assert!(tree.is_valid());
    assert_eq!(
        tree.into_sub_trees(),
        vec![
            ParseNode::Text("a"),
            tag("b", vec![ParseNode::Text("x"), tag("i", vec![ParseNode::Text("y")])]),
            ParseNode::Text("z"),
        ]
    );
}

#[test]
pub fn attributes_move_onto_nodes() {
    let tree = ParseTree::build("[url=\"example.com\"]go[/url]", &registry());
    assert!(tree.is_valid());
    assert_eq!(
        tree.sub_trees(),
        &[ParseNode::Tag {
            name: "url",
            attributes: Attributes::from([("url", "example.com")]),
            children: vec![ParseNode::Text("go")],
        }]
    );
}

#[rstest]
#[case::misordered("[b][i]x[/b][/i]")]
#[case::unclosed("[b]x")]
#[case::unclosed_inner("[b][i]x[/b]")]
#[case::stray_end("x[/b]")]
#[case::unclosed_no_nesting("[code][b]x[/b]")]
#[case::mismatch_then_balanced("[/i][b]x[/b]")]
pub fn invalid_documents(#[case] input: &str) {
    assert!(!ParseTree::build(input, &registry()).is_valid());
}

#[rstest]
#[case::siblings("[b]x[/b][i]y[/i]")]
#[case::repeated_nesting("[b][b]x[/b][/b]")]
#[case::unknown_tags_are_text("[foo]x[/bar]")]
#[case::no_nesting_body("[code][b][/i][/code]")]
#[case::not_a_tag("[b x]")]
pub fn valid_documents(#[case] input: &str) {
    assert!(ParseTree::build(input, &registry()).is_valid());
}

#[test]
pub fn invalid_tree_is_still_built() {
    let tree = ParseTree::build("[b]x[/i]y", &registry());
    assert!(!tree.is_valid());
    assert_eq!(
        tree.sub_trees(),
        &[tag(
            "b",
            vec![ParseNode::Text("x"), ParseNode::Text("[/i]"), ParseNode::Text("y")]
        )]
    );
}

#[test]
pub fn validity_never_recovers() {
    // The stray end tag is the only fault; everything after it balances.
    let tree = ParseTree::build("[/b][b][i]x[/i][/b]", &registry());
    assert!(!tree.is_valid());
}

#[test]
pub fn no_nesting_body_is_a_single_leaf() {
    let tree = ParseTree::build("[code][b]x[/b][/code]", &registry());
    assert!(tree.is_valid());
    assert_eq!(tree.sub_trees(), &[tag("code", vec![ParseNode::Text("[b]x[/b]")])]);
}

#[test]
pub fn tags_without_nesting_keep_inner_tags_as_text() {
    let tree = ParseTree::build("[plain][b]x[/b][/plain]", &registry());
    assert!(tree.is_valid());
    assert_eq!(
        tree.sub_trees(),
        &[tag(
            "plain",
            vec![ParseNode::Text("[b]"), ParseNode::Text("x"), ParseNode::Text("[/b]")]
        )]
    );
}

#[test]
pub fn from_tokens_skips_registry_filtering() {
    // Raw grammar tokens: `foo` is treated as a tag here.
    let registry = registry();
    let tree = ParseTree::from_tokens(BBParser::new("[foo]x[/foo]"), &registry);
    assert!(tree.is_valid());
    assert_eq!(tree.sub_trees(), &[tag("foo", vec![ParseNode::Text("x")])]);
}

#[test]
pub fn deep_trees_build_and_drop() {
    let depth = 20_000;
    let input = format!("{}x{}", "[b]".repeat(depth), "[/b]".repeat(depth));
    let tree = ParseTree::build(&input, &registry());
    assert!(tree.is_valid());
    assert_eq!(tree.sub_trees().len(), 1);
    drop(tree);

    // Unclosed frames are folded into their parents without recursion too.
    let unclosed = "[b]".repeat(depth);
    assert!(!ParseTree::build(&unclosed, &registry()).is_valid());
}
