mod common;

use canlink::Link;
use canlink::config::{Config, InitialFilter};
use canlink::frame::CanFrame;
use canlink::indicator::Activity;
use canlink::loopback::Loopback;
use canlink::status::{ReceiveState, TransmitState};
use common::{Activities, Recorder, leak, std_frame};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embedded_can::{ExtendedId, Frame};
use static_cell::StaticCell;

type TestLink = Link<CriticalSectionRawMutex, Loopback>;

#[test]
fn test_round_trip() {
    static LINK: StaticCell<TestLink> = StaticCell::new();
    let link = LINK.init(Link::new(Loopback::new(), Config::default()));
    let (tx, rx, events) = link.split();
    let handler = leak(Recorder::default());

    let frame = <CanFrame as Frame>::new(ExtendedId::ZERO, b"TesTTesT").unwrap();
    assert_eq!(frame, CanFrame::test_pattern());

    rx.start(handler);
    assert_eq!(tx.transmit(&frame, 0), Ok(()));
    assert!(link.backend().dispatch(events));

    let received = handler.frames();
    assert_eq!(received, [frame]);
    assert!(received[0].is_extended());
    assert_eq!(received[0].raw_id(), 0);
    assert_eq!(received[0].dlc(), 8);
    assert_eq!(received[0].data(), b"TesTTesT");

    assert_eq!(tx.status(), TransmitState::Ready);
    assert_eq!(rx.status(), ReceiveState::Started);
    assert!(link.backend().is_armed());
}

#[test]
fn test_self_test() {
    let activities = leak(Activities::default());
    let link: &Link<CriticalSectionRawMutex, Loopback, &Activities> = leak(
        Link::with_indicator(Loopback::new(), activities, Config::default()),
    );
    let (_, rx, events) = link.split();
    let handler = leak(Recorder::default());

    rx.start(handler);
    assert_eq!(link.send_test(), Ok(()));
    assert!(link.backend().dispatch(events));

    assert_eq!(handler.frames(), [CanFrame::test_pattern()]);
    assert_eq!(
        activities.take(),
        [
            Activity::Transmitted,
            Activity::Transmitted,
            Activity::Received
        ]
    );
}

#[test]
fn test_stream() {
    let link: &TestLink = leak(Link::new(Loopback::new(), Config::default()));
    let (tx, rx, events) = link.split();
    let handler = leak(Recorder::default());
    let frames: Vec<_> = (0..10u16).map(|i| std_frame(i, &[i as u8; 3])).collect();

    rx.start(handler);
    for frame in &frames {
        tx.transmit(frame, 0).unwrap();
        assert!(link.backend().dispatch(events));
    }
    assert_eq!(handler.frames(), frames);
}

#[test]
fn test_no_initial_filter() {
    let mut config = Config::default();
    config.initial_filter = None;
    let link: &TestLink = leak(Link::new(Loopback::new(), config));
    let (_, rx, events) = link.split();
    let handler = leak(Recorder::default());

    rx.start(handler);
    assert_eq!(link.send_test(), Ok(()));
    assert!(!link.backend().dispatch(events));
    assert_eq!(handler.count(), 0);
}

#[test]
fn test_initial_filter() {
    let mut config = Config::default();
    config.initial_filter = Some(InitialFilter {
        id: 0x100,
        mask: 0x700,
    });
    let link: &TestLink = leak(Link::new(Loopback::new(), config));
    let (tx, rx, events) = link.split();
    let handler = leak(Recorder::default());

    rx.start(handler);
    tx.transmit(&std_frame(0x0FF, &[]), 0).unwrap();
    tx.transmit(&std_frame(0x1FF, &[]), 0).unwrap();
    while link.backend().dispatch(events) {}

    assert_eq!(handler.frames(), [std_frame(0x1FF, &[])]);
}
