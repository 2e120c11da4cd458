//! Engine tests. These drive a real ring against real loopback sockets.

use super::*;

use crate::conn::BUF_CAPACITY;

use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::{Duration, Instant};

fn poll_one(engine: &mut ConnEngine) -> Completion {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(completion) = engine.poll().unwrap() {
            return completion;
        }
        if Instant::now() > deadline {
            panic!("no completion within 5s");
        }
        std::thread::yield_now();
    }
}

fn connect(engine: &ConnEngine) -> TcpStream {
    let port = engine.local_port().unwrap();
    TcpStream::connect(("127.0.0.1", port)).unwrap()
}

#[test]
fn poll_on_idle_engine_is_empty() {
    let mut engine = ConnEngine::bind(0, 8).unwrap();
    for _ in 0..3 {
        assert!(engine.poll().unwrap().is_none());
    }
}

#[test]
fn handle_survives_user_data_round_trip() {
    let h = ConnHandle {
        index: 7,
        gen: 0xdead_beef,
    };
    assert_eq!(ConnHandle::decode(h.encode()), h);
}

#[test]
fn one_accept_completion_per_client() {
    let mut engine = ConnEngine::bind(0, 8).unwrap();
    let acceptor = engine.add_conn().unwrap();
    engine.push_accept(acceptor).unwrap();

    let _client = connect(&engine);

    match poll_one(&mut engine) {
        Completion::Accept { conn, result } => {
            assert_eq!(conn, acceptor);
            assert!(result >= 0, "accept failed: {}", result);
            // Store the descriptor into the record that carried the accept.
            engine.adopt_socket(conn, result).unwrap();
        }
        other => panic!("expected an accept completion, got {:?}", other),
    }

    let peer = engine.peer_addr(acceptor).unwrap().unwrap();
    assert!(peer.ip().is_loopback());
    assert!(peer.port() > 0);

    // Exactly one completion for one client.
    assert!(engine.poll().unwrap().is_none());
}

#[test]
fn ping_pong_roundtrip() {
    let mut engine = ConnEngine::bind(0, 16).unwrap();
    let acceptor = engine.add_conn().unwrap();
    engine.push_accept(acceptor).unwrap();

    let mut client = connect(&engine);
    client.write_all(b"ping").unwrap();

    let stream = match poll_one(&mut engine) {
        Completion::Accept { conn, result } => {
            assert!(result >= 0);
            // Fresh slot for the stream, then keep the listener primed.
            let stream = engine.add_conn().unwrap();
            engine.adopt_socket(stream, result).unwrap();
            engine.push_accept(conn).unwrap();
            stream
        }
        other => panic!("expected an accept completion, got {:?}", other),
    };

    engine.push_read(stream).unwrap();
    match poll_one(&mut engine) {
        Completion::Read { conn, result } => {
            assert_eq!(conn, stream);
            assert_eq!(result, 4);
            assert_eq!(&engine.buffer(stream).unwrap()[..4], b"ping");
        }
        other => panic!("expected a read completion, got {:?}", other),
    }

    engine.push_write(stream, b"pong").unwrap();
    match poll_one(&mut engine) {
        Completion::Write { conn, result } => {
            assert_eq!(conn, stream);
            assert_eq!(result, 4);
        }
        other => panic!("expected a write completion, got {:?}", other),
    }

    let mut got = [0u8; 4];
    client.read_exact(&mut got).unwrap();
    assert_eq!(&got, b"pong");

    engine.remove_conn(stream).unwrap();
}

#[test]
fn read_reports_zero_on_peer_close() {
    let mut engine = ConnEngine::bind(0, 8).unwrap();
    let acceptor = engine.add_conn().unwrap();
    engine.push_accept(acceptor).unwrap();

    let client = connect(&engine);
    match poll_one(&mut engine) {
        Completion::Accept { conn, result } => {
            assert!(result >= 0);
            engine.adopt_socket(conn, result).unwrap();
        }
        other => panic!("expected an accept completion, got {:?}", other),
    }

    drop(client);

    engine.push_read(acceptor).unwrap();
    match poll_one(&mut engine) {
        Completion::Read { conn, result } => {
            assert_eq!(conn, acceptor);
            assert_eq!(result, 0);
        }
        other => panic!("expected a read completion, got {:?}", other),
    }
}

#[test]
fn second_submission_refused_while_inflight() {
    let mut engine = ConnEngine::bind(0, 8).unwrap();
    let acceptor = engine.add_conn().unwrap();
    engine.push_accept(acceptor).unwrap();

    let mut client = connect(&engine);
    match poll_one(&mut engine) {
        Completion::Accept { conn, result } => {
            assert!(result >= 0);
            engine.adopt_socket(conn, result).unwrap();
        }
        other => panic!("expected an accept completion, got {:?}", other),
    }

    // Read is in flight; the client has sent nothing yet.
    engine.push_read(acceptor).unwrap();

    assert!(matches!(
        engine.push_read(acceptor),
        Err(EngineError::InvalidOwnership(Owner::Kernel, _))
    ));
    assert!(matches!(
        engine.push_write(acceptor, b"x"),
        Err(EngineError::InvalidOwnership(Owner::Kernel, _))
    ));
    assert!(matches!(
        engine.remove_conn(acceptor),
        Err(EngineError::InvalidOwnership(Owner::Kernel, _))
    ));
    assert!(matches!(
        engine.buffer(acceptor),
        Err(EngineError::InvalidOwnership(Owner::Kernel, _))
    ));

    // Let the read complete, then the slot is releasable again.
    client.write_all(b"x").unwrap();
    match poll_one(&mut engine) {
        Completion::Read { result, .. } => assert_eq!(result, 1),
        other => panic!("expected a read completion, got {:?}", other),
    }
    engine.remove_conn(acceptor).unwrap();
}

#[test]
fn oversized_write_refused() {
    let mut engine = ConnEngine::bind(0, 8).unwrap();
    let conn = engine.add_conn().unwrap();

    let data = vec![0u8; BUF_CAPACITY + 1];
    assert!(matches!(
        engine.push_write(conn, &data),
        Err(EngineError::WriteTooLarge(len)) if len == BUF_CAPACITY + 1
    ));

    // Nothing was submitted; the slot is still freely releasable.
    engine.remove_conn(conn).unwrap();
}

#[test]
fn io_without_adopted_socket_refused() {
    let mut engine = ConnEngine::bind(0, 8).unwrap();
    let conn = engine.add_conn().unwrap();

    assert!(matches!(
        engine.push_read(conn),
        Err(EngineError::NoSocket(_))
    ));
    assert!(matches!(
        engine.push_write(conn, b"hi"),
        Err(EngineError::NoSocket(_))
    ));
    assert!(matches!(
        engine.adopt_socket(conn, -1),
        Err(EngineError::InvalidSocket(-1))
    ));
}

#[test]
fn slot_arena_exhaustion_signaled() {
    let mut engine = ConnEngine::bind(0, 4).unwrap();
    for _ in 0..4 {
        engine.add_conn().unwrap();
    }
    assert!(matches!(
        engine.add_conn(),
        Err(EngineError::SlotsFull(4))
    ));
}

#[test]
fn stale_handle_refused() {
    let mut engine = ConnEngine::bind(0, 8).unwrap();
    let first = engine.add_conn().unwrap();
    engine.remove_conn(first).unwrap();

    assert!(matches!(
        engine.buffer(first),
        Err(EngineError::NotFound(_))
    ));
    assert!(matches!(
        engine.push_accept(first),
        Err(EngineError::NotFound(_))
    ));

    // The slot index gets reused, the stale generation still does not.
    let second = engine.add_conn().unwrap();
    assert_eq!(second.index(), first.index());
    assert_ne!(second, first);
    assert!(matches!(
        engine.buffer(first),
        Err(EngineError::NotFound(_))
    ));
    engine.buffer(second).unwrap();
}

#[test]
fn two_engines_share_one_port() {
    let first = ConnEngine::bind(0, 8).unwrap();
    let port = first.local_port().unwrap();

    let second = ConnEngine::bind(port, 8).unwrap();
    assert_eq!(second.local_port().unwrap(), port);
}
