// ESPAsyncLogger - Build Script
//
// Generates the compile-time configuration from ASYNC_LOG_* environment
// variables before compilation.

use std::env;
use std::fs;
use std::path::PathBuf;

/// Numeric value of `Level::Warn`.
const DEFAULT_LEVEL: u8 = 3;

fn env_or<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    println!("cargo:rerun-if-env-changed={}", name);
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            panic!("{} must be a number, got {:?}", name, raw);
        }),
        Err(_) => default,
    }
}

fn main() {
    // ESP-IDF environment setup (MUST be first!)
    if env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }

    let queue_length: usize = env_or("ASYNC_LOG_QUEUE_LENGTH", 32);
    let task_size: u32 = env_or("ASYNC_LOG_TASK_SIZE", 4096);
    let task_priority: u32 = env_or("ASYNC_LOG_TASK_PRIORITY", 0);
    let task_core_id: i32 = env_or("ASYNC_LOG_TASK_COREID", -1);
    let baud_rate: u32 = env_or("ASYNC_LOG_SERIAL_BAUD_RATE", 115_200);
    let default_level: u8 = env_or("ASYNC_LOG_DEFAULT_LEVEL", DEFAULT_LEVEL);

    println!("cargo:rerun-if-env-changed=ASYNC_LOG_CORE_DEBUG_LEVEL");
    let core_debug_level = match env::var("ASYNC_LOG_CORE_DEBUG_LEVEL") {
        Ok(raw) => {
            let core: u8 = raw.trim().parse().unwrap_or_else(|_| {
                panic!("ASYNC_LOG_CORE_DEBUG_LEVEL must be a number, got {:?}", raw);
            });
            format!("Some({core})")
        }
        Err(_) => "None".to_owned(),
    };

    if queue_length == 0 {
        panic!("ASYNC_LOG_QUEUE_LENGTH must be at least 1");
    }
    if default_level > 9 {
        panic!("ASYNC_LOG_DEFAULT_LEVEL must be in 0..=9, got {}", default_level);
    }

    let generated = format!(
        "// @generated by build.rs - do not edit\n\
         \n\
         /// Number of entries the queue holds before new ones are dropped.\n\
         pub const QUEUE_LENGTH: usize = {queue_length};\n\
         /// Consumer task stack size in bytes (ESP-IDF FreeRTOS).\n\
         pub const TASK_STACK_SIZE: u32 = {task_size};\n\
         /// Consumer task priority.\n\
         pub const TASK_PRIORITY: u32 = {task_priority};\n\
         /// Core the consumer task is pinned to (-1: no affinity).\n\
         pub const TASK_CORE_ID: i32 = {task_core_id};\n\
         /// Baud rate used by `SerialLog` unless overridden.\n\
         pub const SERIAL_BAUD_RATE: u32 = {baud_rate};\n\
         /// Numeric value of the default device level.\n\
         pub const DEFAULT_LEVEL_VALUE: u8 = {default_level};\n\
         /// Platform core debug level (0..=6), if one was given.\n\
         pub const CORE_DEBUG_LEVEL: Option<u8> = {core_debug_level};\n"
    );

    let out = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    fs::write(out.join("config.rs"), generated).expect("failed to write generated config");

    println!("cargo:rerun-if-changed=build.rs");
}
