//! # Events Module
//!
//! Progress reporting for the classification pipeline.
//!
//! The core library emits events through channels; the CLI subscribes and
//! renders them as progress bars.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! // In a separate thread, listen for events
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         match event {
//!             Event::Scan(ScanEvent::Progress(p)) => println!("Found {} photos", p.photos_found),
//!             Event::Extract(ExtractEvent::Progress(p)) => println!("Read {}/{}", p.completed, p.total),
//!             _ => {}
//!         }
//!     }
//! });
//!
//! // Run the pipeline with the sender
//! let plan = pipeline.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{EventChannel, EventReceiver, EventSender, null_sender};
pub use types::*;
