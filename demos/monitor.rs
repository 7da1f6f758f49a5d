//! Print gamepad state as it changes.
//!
//! ```text
//! RUST_LOG=debug cargo run --example monitor -- [config.toml]
//! ```
use stickpad::backends::platform_backend;
use stickpad::eventbus::{EventFilter, Recorder};
use stickpad::logger::Logger;
use stickpad::{Config, InputHub, Notification};
use std::time::Duration;

fn main() {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path).expect("load config"),
        None => Config::default(),
    };
    let backend = platform_backend(&config).expect("no input backend on this platform");
    let mut hub = InputHub::new(backend, &config);

    hub.bus_mut().add_listener(Logger::new(), EventFilter::All, None);
    let actions = Recorder::new();
    hub.bus_mut()
        .add_listener(actions.clone(), EventFilter::ActionsOnly, None);
    for action in hub.bindings().actions().into_iter().map(String::from).collect::<Vec<_>>() {
        hub.monitor_action(&action);
    }

    println!("Devices:");
    for d in hub.manager().devices() {
        println!("- {} ({} axes) at {}", d.id, d.axes.len(), d.device_node);
    }

    loop {
        hub.poll();
        for n in actions.drain() {
            match n {
                Notification::ActionActivated(name) => println!("\naction {name} on"),
                Notification::ActionDeactivated(name) => println!("\naction {name} off"),
                _ => {}
            }
        }
        for (id, pad) in hub.state().snapshot().iter() {
            let axes: Vec<String> = pad
                .axes
                .iter()
                .map(|(axis, v)| format!("{axis:02x}={v:+.2}"))
                .collect();
            print!("\r{id}: [{}] buttons={:?}   ", axes.join(" "), pad.buttons);
        }
        // Sleep a touch to avoid pegging the CPU in the demo
        std::thread::sleep(Duration::from_millis(10));
    }
}
