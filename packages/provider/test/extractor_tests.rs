/**
 * Annotation Extractor Tests
 */
#[path = "utils/mod.rs"]
mod utils;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::utils::{comment, element};
    use binding_provider::{
        AnnotationExtractor, ElementNode, NodeKind, TextNode, UiNode, VirtualBindingLocator,
    };

    /// Locator treating every comment's full text as its annotation
    #[derive(Debug)]
    struct WholeCommentLocator;

    impl VirtualBindingLocator for WholeCommentLocator {
        fn binding_value(&self, node: &dyn UiNode) -> Option<String> {
            if node.node_kind() == NodeKind::Comment {
                node.text().map(str::to_string)
            } else {
                None
            }
        }
    }

    #[test]
    fn should_read_the_binding_attribute_of_elements() {
        let extractor = AnnotationExtractor::default();
        let node = element("text: name");

        assert!(extractor.has_annotation(node.as_ref()));
        assert_eq!(extractor.extract_text(node.as_ref()).as_deref(), Some("text: name"));
    }

    #[test]
    fn should_ignore_elements_without_the_attribute() {
        let extractor = AnnotationExtractor::default();
        let node = ElementNode::new("span").with_attribute("class", "x");

        assert!(!extractor.has_annotation(&node));
        assert_eq!(extractor.extract_text(&node), None);
    }

    #[test]
    fn should_treat_blank_annotations_as_absent() {
        let extractor = AnnotationExtractor::default();

        assert!(!extractor.has_annotation(element("").as_ref()));
        assert!(!extractor.has_annotation(element("   ").as_ref()));
        assert!(!extractor.has_annotation(comment(" ko    ").as_ref()));
    }

    #[test]
    fn should_read_virtual_element_comments() {
        let extractor = AnnotationExtractor::default();
        let start = comment(" ko if: visible ");

        assert!(extractor.has_annotation(start.as_ref()));
        assert_eq!(extractor.extract_text(start.as_ref()).as_deref(), Some("if: visible "));
        assert!(!extractor.has_annotation(comment(" /ko ").as_ref()));
        assert!(!extractor.has_annotation(comment(" plain comment ").as_ref()));
    }

    #[test]
    fn should_ignore_other_node_kinds() {
        let extractor = AnnotationExtractor::default();
        let text = TextNode::new("ko text: name");

        assert!(!extractor.has_annotation(&text));
        assert_eq!(extractor.extract_text(&text), None);
    }

    #[test]
    fn should_use_custom_attribute_and_locator() {
        let extractor = AnnotationExtractor::new("data-ko", Arc::new(WholeCommentLocator));
        let node = ElementNode::new("div")
            .with_attribute("data-bind", "a: 1")
            .with_attribute("data-ko", "b: 2");

        assert_eq!(extractor.attribute_name(), "data-ko");
        assert_eq!(extractor.extract_text(&node).as_deref(), Some("b: 2"));
        assert_eq!(
            extractor.extract_text(comment("c: 3").as_ref()).as_deref(),
            Some("c: 3")
        );
    }
}
