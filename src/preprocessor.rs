use crate::defines::Definitions;
use crate::error::{Error, Result};
use crate::parser::{Directive, DirectiveParser, Located};
use crate::stack::{BitStack, ConditionStack, MAX_DEPTH};
use tracing::{debug, trace};

/// Filters `//@ifdef` blocks out of source text
///
/// Holds the compiled directive grammar, so one instance can be shared
/// across threads and reused for any number of inputs.
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    parser: DirectiveParser,
}

impl Preprocessor {
    /// Create a new preprocessor
    pub fn new() -> Self {
        Self {
            parser: DirectiveParser::new(),
        }
    }

    /// Remove every block whose condition fails and every directive line
    pub fn process(&self, input: &str, defined: &Definitions) -> Result<String> {
        self.process_with::<BitStack>(input, defined)
    }

    /// Same as [`Preprocessor::process`], over an explicit stack type
    pub fn process_with<S: ConditionStack>(&self, input: &str, defined: &Definitions) -> Result<String> {
        let mut output = String::with_capacity(input.len());
        let mut stack = S::default();
        // Lines of the open blocks, innermost last, for error reporting
        let mut openers: Vec<usize> = Vec::new();
        let mut cursor = 0;

        for located in self.parser.scan(input) {
            if stack.is_satisfied() {
                trace!(from = cursor, to = located.start, "emit");
                output.push_str(&input[cursor..located.start]);
            }
            cursor = located.end;

            match located.directive {
                Directive::Ifdef(name) => {
                    let included = defined.is_truthy(name);
                    open(&mut stack, &mut openers, included, &located)?;
                }
                Directive::Ifndef(name) => {
                    let included = !defined.is_truthy(name);
                    open(&mut stack, &mut openers, included, &located)?;
                }
                Directive::Endif => {
                    if stack.pop().is_none() {
                        return Err(Error::UnmatchedEndif { line: located.line });
                    }
                    openers.pop();
                    debug!(line = located.line, depth = stack.depth(), "close block");
                }
            }
        }

        if let Some(&line) = openers.last() {
            return Err(Error::UnbalancedDirectives {
                open: stack.depth(),
                line,
            });
        }

        output.push_str(&input[cursor..]);
        Ok(output)
    }

    /// Every directive line in `input`, in order
    pub fn directives<'a>(&self, input: &'a str) -> Vec<Located<'a>> {
        self.parser.scan(input).collect()
    }
}

fn open<S: ConditionStack>(
    stack: &mut S,
    openers: &mut Vec<usize>,
    included: bool,
    located: &Located<'_>,
) -> Result<()> {
    stack.push(included).map_err(|_| Error::MaxDepthExceeded {
        line: located.line,
        max: MAX_DEPTH,
    })?;
    openers.push(located.line);

    debug!(
        line = located.line,
        directive = %located.directive,
        included,
        depth = stack.depth(),
        "open block"
    );
    Ok(())
}

/// Preprocess `input` once with a throwaway [`Preprocessor`]
///
/// ```
/// use ifdef_pp::{preprocess, Definitions};
///
/// let mut defined = Definitions::new();
/// defined.define("DEBUG", true);
///
/// let output = preprocess("//@ifdef DEBUG\nlog();\n//@endif\nrun();\n", &defined).unwrap();
/// assert_eq!(output, "log();\nrun();\n");
/// ```
pub fn preprocess(input: &str, defined: &Definitions) -> Result<String> {
    Preprocessor::new().process(input, defined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::VecStack;

    const CAKE: &str = "const words = [];
//@ifdef DEFINED
words.push('the', 'cake', 'is');
//@ifdef NOTDEFINED
words.push('the', 'truth');
//@endif
//@endif
//@ifndef DEFINED
words.push('not');
//@ifndef NOTDEFINED
words.push('maybe');
//@endif
//@endif
words.push('a', 'lie');
";

    fn defined(names: &[(&str, bool)]) -> Definitions {
        names.iter().map(|(name, value)| (*name, *value)).collect()
    }

    fn nested(depth: usize) -> String {
        let mut input = String::new();
        for level in 0..depth {
            input.push_str(&format!("//@ifdef L{}\n", level));
        }
        input.push_str("core\n");
        for _ in 0..depth {
            input.push_str("//@endif\n");
        }
        input
    }

    #[test]
    fn test_truth_table() {
        let output = preprocess(CAKE, &defined(&[("DEFINED", true)])).expect("Preprocessing failed");
        assert_eq!(
            output,
            "const words = [];\nwords.push('the', 'cake', 'is');\nwords.push('a', 'lie');\n"
        );
    }

    #[test]
    fn test_truth_table_nothing_defined() {
        let output = preprocess(CAKE, &Definitions::new()).expect("Preprocessing failed");
        assert_eq!(
            output,
            "const words = [];\nwords.push('not');\nwords.push('maybe');\nwords.push('a', 'lie');\n"
        );
    }

    #[test]
    fn test_truth_table_explicit_false_matches_absent() {
        let explicit = preprocess(CAKE, &defined(&[("DEFINED", true), ("NOTDEFINED", false)]))
            .expect("Preprocessing failed");
        let absent = preprocess(CAKE, &defined(&[("DEFINED", true)])).expect("Preprocessing failed");
        assert_eq!(explicit, absent);
    }

    #[test]
    fn test_input_without_directives_is_unchanged() {
        let input = "line one\r\n\n  // just a comment\n\tlast line without newline";
        let output = preprocess(input, &defined(&[("X", true)])).expect("Preprocessing failed");
        assert_eq!(output, input);

        assert_eq!(preprocess("", &Definitions::new()).unwrap(), "");
    }

    #[test]
    fn test_directive_lines_never_emitted() {
        let input = "//@ifdef A\n//@ifndef B\n//@endif\n//@endif\n";
        for names in [&[][..], &[("A", true)][..], &[("A", true), ("B", true)][..]] {
            let output = preprocess(input, &defined(names)).expect("Preprocessing failed");
            assert_eq!(output, "");
        }
    }

    #[test]
    fn test_plain_comments_follow_inclusion() {
        let input = "// top\n//@ifdef A\n// inside\n//@endif\n// bottom\n";

        let kept = preprocess(input, &defined(&[("A", true)])).unwrap();
        assert_eq!(kept, "// top\n// inside\n// bottom\n");

        let dropped = preprocess(input, &Definitions::new()).unwrap();
        assert_eq!(dropped, "// top\n// bottom\n");
    }

    #[test]
    fn test_malformed_directive_is_content() {
        let input = "//@ifdef A // trailing\nbody\n//@endif A\n";
        let output = preprocess(input, &Definitions::new()).expect("Preprocessing failed");
        assert_eq!(output, input);
    }

    #[test]
    fn test_indented_directives() {
        let input = "fn main() {\n    // @ifdef TRACE\n    trace();\n    // @endif\n    run();\n}\n";
        let output = preprocess(input, &Definitions::new()).unwrap();
        assert_eq!(output, "fn main() {\n    run();\n}\n");
    }

    #[test]
    fn test_crlf_line_endings_preserved() {
        let input = "a\r\n//@ifdef X\r\nb\r\n//@endif\r\nc\r\n";

        let output = preprocess(input, &defined(&[("X", true)])).unwrap();
        assert_eq!(output, "a\r\nb\r\nc\r\n");

        let output = preprocess(input, &Definitions::new()).unwrap();
        assert_eq!(output, "a\r\nc\r\n");
    }

    #[test]
    fn test_trailing_directive_without_newline() {
        let input = "//@ifdef X\nbody\n//@endif";
        assert_eq!(preprocess(input, &defined(&[("X", true)])).unwrap(), "body\n");
        assert_eq!(preprocess(input, &Definitions::new()).unwrap(), "");
    }

    #[test]
    fn test_excluded_outer_hides_included_inner() {
        let input = "//@ifdef OUTER\n//@ifndef INNER\nhidden\n//@endif\n//@endif\nshown\n";
        let output = preprocess(input, &Definitions::new()).unwrap();
        assert_eq!(output, "shown\n");
    }

    #[test]
    fn test_max_depth_accepted() {
        let input = nested(MAX_DEPTH);
        let all: Definitions = (0..MAX_DEPTH).map(|level| (format!("L{}", level), true)).collect();

        assert_eq!(preprocess(&input, &all).unwrap(), "core\n");
        assert_eq!(preprocess(&input, &Definitions::new()).unwrap(), "");
    }

    #[test]
    fn test_max_depth_exceeded() {
        let input = nested(MAX_DEPTH + 1);
        let err = preprocess(&input, &Definitions::new()).unwrap_err();
        assert_eq!(err, Error::MaxDepthExceeded { line: MAX_DEPTH + 1, max: MAX_DEPTH });
    }

    #[test]
    fn test_unbalanced_directives() {
        let input = "a\n//@ifdef A\nb\n//@ifndef B\nc\n//@endif\n";
        for names in [&[][..], &[("A", true)][..], &[("B", true)][..]] {
            let err = preprocess(input, &defined(names)).unwrap_err();
            assert_eq!(err, Error::UnbalancedDirectives { open: 1, line: 2 });
        }
    }

    #[test]
    fn test_unmatched_endif() {
        let input = "//@ifdef A\n//@endif\nx\n//@endif\n";
        let err = preprocess(input, &Definitions::new()).unwrap_err();
        assert_eq!(err, Error::UnmatchedEndif { line: 4 });
    }

    #[test]
    fn test_stack_representations_agree() {
        let preprocessor = Preprocessor::new();
        let inputs = [CAKE.to_string(), nested(MAX_DEPTH), nested(MAX_DEPTH + 1), "//@endif\n".to_string()];
        let definitions = [
            Definitions::new(),
            defined(&[("DEFINED", true), ("L3", true)]),
            (0..MAX_DEPTH).map(|level| (format!("L{}", level), true)).collect(),
        ];

        for input in &inputs {
            for defs in &definitions {
                assert_eq!(
                    preprocessor.process_with::<BitStack>(input, defs),
                    preprocessor.process_with::<VecStack>(input, defs),
                );
            }
        }
    }

    #[test]
    fn test_output_is_subsequence_of_lines() {
        let output = preprocess(CAKE, &defined(&[("NOTDEFINED", true)])).unwrap();
        let mut source = CAKE.lines();
        for line in output.lines() {
            assert!(source.any(|candidate| candidate == line), "line {:?} out of order", line);
        }
    }

    #[test]
    fn test_directives_listing() {
        let preprocessor = Preprocessor::new();
        let found = preprocessor.directives(CAKE);
        assert_eq!(found.len(), 8);
        assert_eq!(found[0].directive, Directive::Ifdef("DEFINED"));
        assert_eq!(found[0].line, 2);
        assert_eq!(found[7].directive, Directive::Endif);
        assert_eq!(found[7].line, 13);
    }
}
