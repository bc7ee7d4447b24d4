//! View tree traversal

use crate::host::{HostError, LayoutHost};
use crate::registry::ViewNode;

/// Visit `root` and every descendant in pre-order.
///
/// Children are read after their parent has been visited, so a visitor may
/// change what gets walked below the node it is looking at.
pub fn walk_depth_first<H, F>(host: &mut H, root: ViewNode, mut visit: F) -> Result<(), HostError>
where
    H: LayoutHost + ?Sized,
    F: FnMut(&mut H, ViewNode) -> Result<(), HostError>,
{
    let mut stack = vec![root];
    while let Some(view) = stack.pop() {
        visit(host, view)?;
        stack.extend(host.children(view).into_iter().rev());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Priority;
    use crate::host::{ContentPriority, SolverHost};
    use crate::vocab::Axis;

    #[test]
    fn test_pre_order() {
        let mut host = SolverHost::new();
        let root = host.create_view();
        let a = host.create_view();
        let a1 = host.create_view();
        let b = host.create_view();
        host.attach(root, a).unwrap();
        host.attach(a, a1).unwrap();
        host.attach(root, b).unwrap();

        let mut seen = Vec::new();
        walk_depth_first(&mut host, root, |_, view| {
            seen.push(view);
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec![root, a, a1, b]);
    }

    #[test]
    fn test_visitor_can_mutate_host() {
        let mut host = SolverHost::new();
        let root = host.create_view();
        let child = host.create_view();
        host.attach(root, child).unwrap();

        walk_depth_first(&mut host, root, |host, view| {
            host.set_content_priority(
                view,
                Priority::REQUIRED,
                Axis::Vertical,
                ContentPriority::Hugging,
            )
        })
        .unwrap();
        assert_eq!(
            host.content_priority(child, Axis::Vertical, ContentPriority::Hugging),
            Some(Priority::REQUIRED)
        );
    }

    #[test]
    fn test_visitor_error_stops_walk() {
        let mut host = SolverHost::new();
        let root = host.create_view();
        let child = host.create_view();
        host.attach(root, child).unwrap();

        let mut count = 0;
        let result = walk_depth_first(&mut host, root, |_, _| {
            count += 1;
            Err(HostError::Internal("stop".to_string()))
        });
        assert!(result.is_err());
        assert_eq!(count, 1);
    }
}
