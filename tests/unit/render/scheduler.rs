use super::*;

#[test]
fn request_cancel_and_drain() {
    let mut q = FrameQueue::new();
    let a = q.request(FrameTask::Animate);
    let b = q.request(FrameTask::Repaint);
    assert_ne!(a, b);
    assert!(q.is_pending(a));
    assert_eq!(q.count(FrameTask::Repaint), 1);

    assert!(q.cancel(a));
    assert!(!q.cancel(a));
    assert_eq!(q.take_due(), vec![(b, FrameTask::Repaint)]);
    assert!(!q.has_pending());
    assert!(!q.is_pending(b));
}
