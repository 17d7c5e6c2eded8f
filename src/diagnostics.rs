// Copyright Motia LLC and/or licensed to Motia LLC under one or more
// contributor license agreements. Licensed under the Elastic License 2.0;
// you may not use this file except in compliance with the Elastic License 2.0.
// This software is patent protected. We welcome discussions - reach out at support@motia.dev
// See LICENSE and PATENTS files for details.

use std::error::Error;

/// Upper bound on how many layers of a cause chain are reported.
pub const MAX_CAUSE_DEPTH: usize = 32;

/// Flattens an error and its `source()` chain into display messages, outermost first.
///
/// Stops after [`MAX_CAUSE_DEPTH`] layers or when a source points back at an
/// error already visited.
pub fn extract_messages(error: &(dyn Error + 'static)) -> Vec<String> {
    let mut messages = Vec::new();
    let mut visited: Vec<*const dyn Error> = Vec::new();
    let mut current = Some(error);

    while let Some(err) = current {
        if messages.len() >= MAX_CAUSE_DEPTH {
            break;
        }

        // A newtype wrapper shares its address with its source, so compare vtables too.
        let ptr = err as *const dyn Error;
        if visited.iter().any(|seen| std::ptr::eq(*seen, ptr)) {
            break;
        }
        visited.push(ptr);

        messages.push(err.to_string());
        current = err.source();
    }

    messages
}

/// Same as [`extract_messages`] for an `anyhow::Error`, including its context layers.
pub fn extract_fault_messages(fault: &anyhow::Error) -> Vec<String> {
    let error: &(dyn Error + 'static) = fault.as_ref();
    extract_messages(error)
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use anyhow::Context;

    use super::*;

    #[derive(Debug)]
    struct Layer {
        depth: usize,
        inner: Option<Box<Layer>>,
    }

    impl Layer {
        fn chain(depth: usize) -> Self {
            let mut layer = Layer {
                depth: 0,
                inner: None,
            };
            for d in 1..depth {
                layer = Layer {
                    depth: d,
                    inner: Some(Box::new(layer)),
                };
            }
            layer
        }
    }

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "layer {}", self.depth)
        }
    }

    impl Error for Layer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            self.inner.as_deref().map(|inner| inner as &(dyn Error + 'static))
        }
    }

    #[derive(Debug)]
    struct Loop;

    impl fmt::Display for Loop {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("loop")
        }
    }

    impl Error for Loop {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(self)
        }
    }

    #[derive(Debug)]
    struct Wrap(std::io::Error);

    impl fmt::Display for Wrap {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("wrapper")
        }
    }

    impl Error for Wrap {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    fn refused() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused")
    }

    #[test]
    fn walks_causes_outermost_first() {
        let messages = extract_messages(&Layer::chain(3));

        assert_eq!(messages, vec!["layer 2", "layer 1", "layer 0"]);
    }

    #[test]
    fn single_error_yields_one_message() {
        let error = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");

        assert_eq!(extract_messages(&error), vec!["refused"]);
    }

    #[test]
    fn stops_at_depth_cap() {
        let messages = extract_messages(&Layer::chain(MAX_CAUSE_DEPTH + 8));

        assert_eq!(messages.len(), MAX_CAUSE_DEPTH);
        assert_eq!(messages[0], format!("layer {}", MAX_CAUSE_DEPTH + 7));
    }

    #[test]
    fn self_referencing_source_terminates() {
        let looped = Loop;
        let start = looped.source().expect("loop has a source");

        assert_eq!(extract_messages(start), vec!["loop"]);
    }

    #[test]
    fn newtype_wrapper_keeps_its_inline_source() {
        assert_eq!(extract_messages(&Wrap(refused())), vec!["wrapper", "refused"]);
    }

    #[test]
    fn anyhow_context_over_newtype_wrapper_keeps_root_cause() {
        let fault = anyhow::Error::new(Wrap(refused())).context("outer");

        assert_eq!(
            extract_fault_messages(&fault),
            vec!["outer", "wrapper", "refused"]
        );
    }

    #[test]
    fn anyhow_context_layers_come_before_root_cause() {
        let root = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let fault = Err::<(), _>(root)
            .context("publish request to the sidecar failed")
            .context("pubsub events")
            .unwrap_err();

        assert_eq!(
            extract_fault_messages(&fault),
            vec![
                "pubsub events",
                "publish request to the sidecar failed",
                "connection refused",
            ]
        );
    }
}
