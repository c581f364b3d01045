use lazy_stream::{
    Backward, DoublyLinkedStream, Forward, LinearStream, LinkExt, Stream, StreamConfig,
    StreamResult,
};
use std::cell::Cell;
use std::rc::Rc;

fn collect(stream: &DoublyLinkedStream<i32>) -> Vec<i32> {
    stream.iter().collect::<StreamResult<_>>().unwrap()
}

fn backward(stream: &DoublyLinkedStream<i32>) -> Vec<i32> {
    collect(&stream.reverse())
}

fn one_to_three() -> DoublyLinkedStream<i32> {
    DoublyLinkedStream::build_from(vec![1, 2, 3]).unwrap()
}

#[test]
fn test_build_from_round_trip() {
    assert_eq!(collect(&one_to_three()), vec![1, 2, 3]);
    assert!(DoublyLinkedStream::<i32>::build_from(Vec::new()).is_none());
}

#[test]
fn test_build_from_links_back_to_previous_nodes() {
    let head = one_to_three();
    let second = head.next().unwrap().unwrap();
    let third = second.next().unwrap().unwrap();

    assert!(third.previous().unwrap().unwrap().ptr_eq(&second));
    assert!(second.previous().unwrap().unwrap().ptr_eq(&head));
    assert!(head.previous().unwrap().is_none());
    assert!(third.next().unwrap().is_none());
}

#[test]
fn test_build_from_without_memoization_still_links_back() {
    let head =
        DoublyLinkedStream::from_iter_with_config(vec![1, 2, 3], StreamConfig::recomputing())
            .unwrap();
    let second = head.next().unwrap().unwrap();
    assert!(!second.is_previous_resolved());
    assert!(second.previous().unwrap().unwrap().ptr_eq(&head));
}

#[test]
fn test_from_iter_after_uses_given_previous() {
    let before = DoublyLinkedStream::forward_only(0, || Ok(None));
    let anchor = before.clone();
    let head = DoublyLinkedStream::from_iter_after(
        vec![1, 2],
        move || Ok(Some(anchor.clone())),
        StreamConfig::default(),
    )
    .unwrap();

    assert!(head.previous().unwrap().unwrap().ptr_eq(&before));
    assert_eq!(head.index(-1).unwrap(), 0);
}

#[test]
fn test_resolving_next_back_fills_previous() {
    let previous_calls = Rc::new(Cell::new(0));
    let counter = previous_calls.clone();
    let b = DoublyLinkedStream::new(
        2,
        || Ok(None),
        move || {
            counter.set(counter.get() + 1);
            Ok(None)
        },
    );

    let target = b.clone();
    let a = DoublyLinkedStream::forward_only(1, move || Ok(Some(target.clone())));

    assert!(!b.is_previous_resolved());
    assert!(a.next().unwrap().unwrap().ptr_eq(&b));
    assert!(b.is_previous_resolved());
    assert!(b.previous().unwrap().unwrap().ptr_eq(&a));
    assert_eq!(previous_calls.get(), 0);
}

#[test]
fn test_back_fill_never_overwrites_a_resolved_link() {
    let elsewhere = DoublyLinkedStream::forward_only(0, || Ok(None));
    let origin = elsewhere.clone();
    let b = DoublyLinkedStream::new(2, || Ok(None), move || Ok(Some(origin.clone())));
    assert!(b.previous().unwrap().unwrap().ptr_eq(&elsewhere));

    let target = b.clone();
    let a = DoublyLinkedStream::forward_only(1, move || Ok(Some(target.clone())));
    a.next().unwrap();

    assert!(b.previous().unwrap().unwrap().ptr_eq(&elsewhere));
}

#[test]
fn test_recomputing_nodes_do_not_back_fill() {
    let b = DoublyLinkedStream::with_config(
        2,
        || Ok(None),
        || Ok(None),
        StreamConfig::recomputing(),
    );
    let target = b.clone();
    let a = DoublyLinkedStream::with_config(
        1,
        move || Ok(Some(target.clone())),
        || Ok(None),
        StreamConfig::recomputing(),
    );

    a.next().unwrap();
    assert!(!b.is_previous_resolved());
    assert!(b.previous().unwrap().is_none());
}

#[test]
fn test_memoized_links_are_identical() {
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let node = DoublyLinkedStream::new(
        0,
        || Ok(None),
        move || {
            counter.set(counter.get() + 1);
            Ok(Some(DoublyLinkedStream::forward_only(counter.get(), || Ok(None))))
        },
    );

    let first = node.previous().unwrap().unwrap();
    let second = node.previous().unwrap().unwrap();
    assert!(first.ptr_eq(&second));
    assert_eq!(calls.get(), 1);

    // The discovered node now points forward at the node that found it
    assert!(first.next().unwrap().unwrap().ptr_eq(&node));
}

#[test]
fn test_cyclic_ring_is_reference_stable() {
    // a <-> b <-> a, described only in the forward direction
    let a = DoublyLinkedStream::cyclic(1, |a| {
        let next = move || {
            let a = a.clone();
            Ok(Some(DoublyLinkedStream::forward_only(2, move || Ok(a.upgrade()))))
        };
        (next, || Ok(None))
    });

    let b = a.next().unwrap().unwrap();
    assert!(a.advance_by(2).unwrap().ptr_eq(&a));
    assert!(a.advance_by(5).unwrap().ptr_eq(&b));

    // Walking forward wired every backward link
    assert!(a.previous().unwrap().unwrap().ptr_eq(&b));
    assert!(b.previous().unwrap().unwrap().ptr_eq(&a));
    assert!(a.advance_by(-4).unwrap().ptr_eq(&a));

    let values: Vec<i32> = a.iter().take(5).collect::<StreamResult<_>>().unwrap();
    assert_eq!(values, vec![1, 2, 1, 2, 1]);
}

#[test]
fn test_negative_index_walks_backward() {
    let end = one_to_three().advance_by(2).unwrap();
    assert_eq!(end.index(0).unwrap(), 3);
    assert_eq!(end.index(-1).unwrap(), 2);
    assert_eq!(end.index(-2).unwrap(), 1);
    assert!(end.index(-3).unwrap_err().is_out_of_range());
    assert!(end.index(1).unwrap_err().is_out_of_range());
}

#[test]
fn test_reverse_round_trip() {
    let end = one_to_three().advance_by(2).unwrap();
    let reversed = end.reverse();

    assert_eq!(collect(&reversed), vec![3, 2, 1]);
    assert!(reversed.memoizes());

    // Reversed nodes link back to each other
    let middle = reversed.next().unwrap().unwrap();
    assert!(middle.previous().unwrap().unwrap().ptr_eq(&reversed));
    assert_eq!(collect(&middle.reverse()), vec![2, 3]);
}

#[test]
fn test_reverse_without_memoization() {
    let head =
        DoublyLinkedStream::from_iter_with_config(vec![1, 2, 3], StreamConfig::recomputing())
            .unwrap();
    let end = head.advance_by(2).unwrap();
    let reversed = end.reverse();

    assert!(!reversed.memoizes());
    assert_eq!(collect(&reversed), vec![3, 2, 1]);

    let first = reversed.next().unwrap().unwrap();
    let second = reversed.next().unwrap().unwrap();
    assert!(!first.ptr_eq(&second));
}

#[test]
fn test_reverse_link_of_absent_is_absent() {
    assert!(DoublyLinkedStream::<i32>::reverse_link(None).is_none());
    let head = one_to_three();
    let reversed = DoublyLinkedStream::reverse_link(Some(head)).unwrap();
    assert_eq!(collect(&reversed), vec![1]);
}

#[test]
fn test_filter_links_both_directions() {
    let head = DoublyLinkedStream::build_from(1..=10).unwrap();
    let evens = head.filter(|x| x % 2 == 0).unwrap().unwrap();
    assert_eq!(collect(&evens), vec![2, 4, 6, 8, 10]);

    let six = evens.advance_by(2).unwrap();
    assert_eq!(six.value(), 6);
    assert_eq!(backward(&six), vec![6, 4, 2]);
    assert!(six.index(-3).unwrap_err().is_out_of_range());
}

#[test]
fn test_filter_walks_backward_without_memoization() {
    let head =
        DoublyLinkedStream::from_iter_with_config(1..=10, StreamConfig::recomputing()).unwrap();
    let seven = head.advance_by(6).unwrap();
    let odds = seven.filter(|x| x % 2 == 1).unwrap().unwrap();

    assert_eq!(odds.value(), 7);
    assert_eq!(odds.index(-1).unwrap(), 5);
    assert_eq!(odds.index(-3).unwrap(), 1);
    assert_eq!(odds.index(1).unwrap(), 9);
    assert!(!odds.memoizes());
}

#[test]
fn test_filter_without_match_is_absent() {
    let head = DoublyLinkedStream::build_from(vec![1, 3, 5]).unwrap();
    assert!(head.filter(|x| x % 2 == 0).unwrap().is_none());
}

#[test]
fn test_map_links_both_directions() {
    let a = one_to_three();
    let b = DoublyLinkedStream::build_from(vec![10, 20, 30, 40]).unwrap();
    let sums = a.zip_with(&b, |x, y| x + y);

    assert_eq!(collect(&sums), vec![11, 22, 33]);

    let last = sums.advance_by(2).unwrap();
    assert_eq!(backward(&last), vec![33, 22, 11]);
}

#[test]
fn test_map_backward_from_the_end() {
    let a_end = one_to_three().advance_by(2).unwrap();
    let b_end = DoublyLinkedStream::build_from(vec![100, 200, 300])
        .unwrap()
        .advance_by(2)
        .unwrap();

    let products = DoublyLinkedStream::map_with((a_end, b_end), |(x, y)| x * y);
    assert_eq!(products.value(), 900);
    assert_eq!(backward(&products), vec![900, 400, 100]);

    let doubled = one_to_three().map(|x| x * 2);
    assert_eq!(collect(&doubled), vec![2, 4, 6]);
}

#[test]
fn test_skip_by_links_both_directions() {
    let head = DoublyLinkedStream::build_from(0..10).unwrap();
    assert_eq!(collect(&head.skip_by(3)), vec![0, 3, 6, 9]);

    let nine = head.advance_by(9).unwrap();
    let stepped = nine.skip_by(3);
    assert_eq!(backward(&stepped), vec![9, 6, 3, 0]);
}

#[test]
fn test_skip_by_huge_step_ends_both_directions() {
    let five = DoublyLinkedStream::build_from(0..10)
        .unwrap()
        .advance_by(5)
        .unwrap();

    let stepped = five.skip_by(usize::MAX);
    assert_eq!(stepped.value(), 5);
    assert!(stepped.next().unwrap().is_none());
    assert!(stepped.previous().unwrap().is_none());

    let stepped = five.skip_by(isize::MAX as usize + 1);
    assert!(stepped.next().unwrap().is_none());
    assert!(stepped.previous().unwrap().is_none());
}

#[test]
fn test_skip_by_zero_is_a_single_node() {
    let five = DoublyLinkedStream::build_from(0..10)
        .unwrap()
        .advance_by(5)
        .unwrap();

    let stepped = five.skip_by(0);
    assert_eq!(collect(&stepped), vec![5]);
    assert_eq!(backward(&stepped), vec![5]);
}

#[test]
fn test_limit_to_bounds_forward_only() {
    let head = DoublyLinkedStream::build_from(0..10).unwrap();
    let five = head.advance_by(5).unwrap();
    let limited = five.limit_to(2).unwrap();

    assert_eq!(collect(&limited), vec![5, 6]);

    let four = limited.previous().unwrap().unwrap();
    assert_eq!(four.value(), 4);
    assert_eq!(collect(&four), vec![4, 5, 6]);
    assert_eq!(backward(&limited), vec![5, 4, 3, 2, 1, 0]);
}

#[test]
fn test_limit_past_length_fails_at_the_end() {
    let limited = one_to_three().limit_to(5);
    let values: Vec<StreamResult<i32>> = limited.values().collect();

    assert_eq!(values.len(), 4);
    assert_eq!(values[2], Ok(3));
    assert!(values[3].as_ref().unwrap_err().is_out_of_range());
}

#[test]
fn test_contains_searches_both_directions() {
    let end = one_to_three().advance_by(2).unwrap();
    assert!(end.contains(&3).unwrap());
    assert!(end.contains(&1).unwrap());
    assert!(!end.contains(&7).unwrap());
}

#[test]
fn test_debug_shows_link_states() {
    let head = one_to_three();
    head.next().unwrap();
    let printed = format!("{:?}", head);
    assert!(printed.starts_with("DoublyLinkedStream"));
    assert!(printed.contains("next: resolved"));
    assert!(printed.contains("previous: deferred"));
}

#[test]
fn test_memoized_self_loop_is_freed() {
    let node = DoublyLinkedStream::cyclic(7, |this| {
        let back = this.clone();
        (move || Ok(this.upgrade()), move || Ok(back.upgrade()))
    });
    let weak = node.downgrade();

    assert!(node.next().unwrap().unwrap().ptr_eq(&node));
    // Back-filled from the forward resolution
    assert!(node.is_previous_resolved());
    assert!(node.previous().unwrap().unwrap().ptr_eq(&node));
    assert_eq!(node.index(-3).unwrap(), 7);

    drop(node);
    assert!(weak.upgrade().is_none());
}
