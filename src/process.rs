/*!
The process-enumeration contract the core consumes.

As with [`crate::module`], enumerating the running processes on a system is
an OS-specific external collaborator and is out of scope here; `OsProcess`
is only the shape that collaborator is expected to produce.
*/

use crate::platform::Architecture;

/// Informational description of a running process, as produced by an
/// external, OS-specific process enumerator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OsProcess {
    pub id: u32,
    pub name: Option<String>,
    pub architecture: Architecture,
    pub main_module: Option<crate::module::ProcessModule>,
    pub path: Option<String>,
    pub is_running: Option<bool>,
    pub is_elevated: Option<bool>,
}
