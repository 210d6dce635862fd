//! Connecting operator fields.

use crate::base::FieldOperator;
use noodles_core::error::Result;
use noodles_core::flow::Edge;
use noodles_core::traits::Operator;
use std::sync::Arc;

/// Connect `source.source_handle` to `target.target_handle`.
///
/// The target input starts reading the source output cell, and pulls of
/// the target pull the source first. Returns the data edge to register
/// with the engine.
///
/// # Example
///
/// ```ignore
/// let edge = connect(&number, "out", &*add, "a")?;
/// engine.build_from_edges(&[edge]);
/// ```
pub fn connect<S, T>(
    source: &Arc<S>,
    source_handle: &str,
    target: &T,
    target_handle: &str,
) -> Result<Edge>
where
    S: FieldOperator + 'static,
    T: FieldOperator + ?Sized,
{
    wire(source, source_handle, target, target_handle)?;
    Ok(Edge::new(
        source.id(),
        source_handle,
        target.id(),
        target_handle,
    ))
}

/// Connect a loop body output back into a loop accumulator input.
///
/// Behaves like [`connect`] but returns a loop-carry edge, which the
/// scheduler leaves out of ordering and cycle checks.
pub fn connect_loop<S, T>(
    source: &Arc<S>,
    source_handle: &str,
    target: &T,
    target_handle: &str,
) -> Result<Edge>
where
    S: FieldOperator + 'static,
    T: FieldOperator + ?Sized,
{
    wire(source, source_handle, target, target_handle)?;
    Ok(Edge::loop_carry(
        source.id(),
        source_handle,
        target.id(),
        target_handle,
    ))
}

fn wire<S, T>(source: &Arc<S>, source_handle: &str, target: &T, target_handle: &str) -> Result<()>
where
    S: FieldOperator + 'static,
    T: FieldOperator + ?Sized,
{
    let field = source.core().output(source_handle)?.clone();
    let input = target.core().input(target_handle)?;

    let upstream: Arc<dyn Operator> = source.clone();
    input.connect(source.id().clone(), field, Arc::downgrade(&upstream));

    tracing::trace!(
        source = %source.id(),
        source_handle,
        target = %target.id(),
        target_handle,
        "Fields connected"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AddOp, NumberOp};
    use noodles_core::flow::EdgeKind;
    use noodles_core::value::Value;

    #[tokio::test]
    async fn pull_resolves_connected_upstream() {
        let a = Arc::new(NumberOp::new("/a", 2));
        let b = Arc::new(NumberOp::new("/b", 5));
        let add = AddOp::new("/add");

        let edge = connect(&a, "out", &add, "a").unwrap();
        connect(&b, "out", &add, "b").unwrap();

        assert_eq!(edge.source.as_str(), "/a");
        assert_eq!(edge.target_handle, "a");
        assert_eq!(add.pull().await.unwrap(), Value::int(7));
        assert!(!a.is_dirty());
    }

    #[test]
    fn unknown_handles_are_rejected() {
        let a = Arc::new(NumberOp::new("/a", 2));
        let add = AddOp::new("/add");
        assert!(connect(&a, "nope", &add, "a").is_err());
        assert!(connect(&a, "out", &add, "c").is_err());
        assert!(!add.core().input("a").unwrap().is_connected());
    }

    #[test]
    fn loop_edges_are_loop_carry() {
        let add = Arc::new(AddOp::new("/add"));
        let meta = crate::flow::ForLoopMetaOp::new("/meta", 0);
        let edge = connect_loop(&add, "out", &meta, "currentValue").unwrap();
        assert_eq!(edge.kind, EdgeKind::LoopCarry);
    }

    #[test]
    fn upstream_is_held_weakly() {
        let add = AddOp::new("/add");
        {
            let a = Arc::new(NumberOp::new("/a", 2));
            connect(&a, "out", &add, "a").unwrap();
        }
        assert!(add.core().upstream().is_empty());
    }
}
