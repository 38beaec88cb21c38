/*!
Foreign-process backends: one `MemViewUser` implementation per supported
OS, each mediating access through a target-owning OS handle acquired at
construction and released exactly once, on `Drop`.
*/

#[cfg(target_os = "macos")]
mod darwin;
#[cfg(target_os = "macos")]
pub use darwin::MemViewUser;

#[cfg(target_os = "windows")]
mod windows;
#[cfg(target_os = "windows")]
pub use windows::MemViewUser;
