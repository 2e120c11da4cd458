//! Caller-driven echo loop over the connection engine.
//!
//! Demonstrates the whole caller contract: the accept is explicitly
//! re-armed after every accept completion, each connection cycles
//! read -> write -> read, and slots are released on EOF or error.
//!
//! Run with an optional port argument (0 picks an ephemeral port):
//!
//! ```text
//! cargo run --example echo -- 7777
//! ```

use ringmux_engine::{Completion, ConnEngine};

fn main() {
    let port = std::env::args()
        .nth(1)
        .and_then(|p| p.parse().ok())
        .unwrap_or(0);

    let mut engine = ConnEngine::bind(port, 256).expect("engine setup");
    println!("echo engine on port {}", engine.local_port().expect("bound port"));

    let acceptor = engine.add_conn().expect("acceptor slot");
    engine.push_accept(acceptor).expect("initial accept");

    loop {
        let completion = match engine.poll().expect("poll") {
            None => {
                std::thread::yield_now();
                continue;
            }
            Some(completion) => completion,
        };

        match completion {
            Completion::Accept { conn, result } => {
                if result >= 0 {
                    let stream = match engine.add_conn() {
                        Ok(stream) => stream,
                        Err(_) => {
                            // Arena full: drop the newcomer, keep accepting.
                            unsafe { libc::close(result) };
                            engine.push_accept(conn).expect("re-arm accept");
                            continue;
                        }
                    };
                    engine.adopt_socket(stream, result).expect("adopt");
                    engine.push_read(stream).expect("first read");
                }
                // Without this, no accept is outstanding and new clients
                // sit in the listen backlog forever.
                engine.push_accept(conn).expect("re-arm accept");
            }
            Completion::Read { conn, result } => {
                if result <= 0 {
                    let _ = engine.remove_conn(conn);
                } else {
                    let echoed =
                        engine.buffer(conn).expect("buffer")[..result as usize].to_vec();
                    engine.push_write(conn, &echoed).expect("write");
                }
            }
            Completion::Write { conn, result } => {
                if result <= 0 {
                    let _ = engine.remove_conn(conn);
                } else {
                    engine.push_read(conn).expect("next read");
                }
            }
        }
    }
}
