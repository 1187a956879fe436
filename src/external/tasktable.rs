// Tue Jan 13 2026 - Alex

use crate::model::{Task, TaskSection};
use crate::symtab::SymbolTable;
use libloading::{Library, Symbol};
use std::collections::HashMap;
use std::ffi::{c_char, c_int, CStr};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskTableError {
    #[error("failed to load task table library: {0}")]
    LoadFailed(#[from] libloading::Error),
    #[error("task table library returned a null taskinfo array")]
    NullArray,
    #[error("task table entry has a non-UTF8 or null name/routine string")]
    InvalidString,
    #[error("routine symbol `{0}` resolves to more than one address")]
    AmbiguousRoutineSymbol(String),
    #[error("routine symbol `{0}` was not found in the symbol table")]
    UnresolvedRoutine(String),
}

/// One entry of the compiled task table, mirroring `struct taskinfo` in the
/// original `export_taskinfo.so.c`: a task name, its entry routine's
/// symbol name (resolved to an address separately by string match), and
/// its declared stack budget (§6, §10.4).
#[derive(Debug, Clone)]
pub struct RawTaskInfo {
    pub name: String,
    pub routine_name: String,
    pub stack_size: u32,
}

/// Loads the compiled task table for a given image section. Abstracted so
/// the core pipeline and its tests never touch the `unsafe` FFI mechanics
/// directly (§10.4).
pub trait TaskTableLoader {
    fn load_task_table(&self, section: TaskSection) -> Result<Vec<RawTaskInfo>, TaskTableError>;
}

#[repr(C)]
struct TaskInfoFfi {
    name: *const c_char,
    routine: *const c_char,
    stack_size: u32,
}

type GetTaskInfosFn = unsafe extern "C" fn(*mut *const TaskInfoFfi) -> c_int;

/// `dlopen`s the compiled `export_taskinfo.so` utility and calls its
/// `get_ro_taskinfos`/`get_rw_taskinfos` C entry points, matching the
/// original tool's `ctypes.CDLL` use exactly (§10.4).
pub struct DlopenTaskTableLoader {
    library: Library,
}

impl DlopenTaskTableLoader {
    /// # Safety contract
    /// Loading an arbitrary shared object runs its initializers; this is
    /// the same trust boundary the original tool accepts by calling
    /// `ctypes.CDLL` on a build-produced artifact.
    pub fn open(path: &str) -> Result<Self, TaskTableError> {
        let library = unsafe { Library::new(path)? };
        Ok(Self { library })
    }
}

impl TaskTableLoader for DlopenTaskTableLoader {
    fn load_task_table(&self, section: TaskSection) -> Result<Vec<RawTaskInfo>, TaskTableError> {
        let symbol_name: &[u8] = match section {
            TaskSection::Ro => b"get_ro_taskinfos\0",
            TaskSection::Rw => b"get_rw_taskinfos\0",
        };

        unsafe {
            let get_taskinfos: Symbol<GetTaskInfosFn> = self.library.get(symbol_name)?;

            let mut array_ptr: *const TaskInfoFfi = std::ptr::null();
            let count = get_taskinfos(&mut array_ptr);
            if count > 0 && array_ptr.is_null() {
                return Err(TaskTableError::NullArray);
            }

            let entries = std::slice::from_raw_parts(array_ptr, count.max(0) as usize);
            entries.iter().map(|entry| ffi_entry_to_owned(entry)).collect()
        }
    }
}

unsafe fn ffi_entry_to_owned(entry: &TaskInfoFfi) -> Result<RawTaskInfo, TaskTableError> {
    let name = c_str_to_owned(entry.name)?;
    let routine_name = c_str_to_owned(entry.routine)?;
    Ok(RawTaskInfo { name, routine_name, stack_size: entry.stack_size })
}

unsafe fn c_str_to_owned(ptr: *const c_char) -> Result<String, TaskTableError> {
    if ptr.is_null() {
        return Err(TaskTableError::InvalidString);
    }
    CStr::from_ptr(ptr).to_str().map(str::to_owned).map_err(|_| TaskTableError::InvalidString)
}

/// Resolves each task's routine name to an address by string match against
/// the symbol table, mirroring `LoadTasklist`'s routine-resolution pass.
/// It's more efficient to resolve every routine together rather than one
/// lookup at a time, since the symbol table is scanned once either way.
pub fn resolve_task_routines(
    raw_tasks: Vec<RawTaskInfo>,
    symtab: &SymbolTable,
) -> Result<Vec<Task>, TaskTableError> {
    let mut routine_map: HashMap<&str, u64> = HashMap::new();
    for symbol in symtab.functions() {
        if raw_tasks.iter().any(|t| t.routine_name == symbol.name()) {
            if routine_map.insert(symbol.name(), symbol.address().as_u64()).is_some() {
                return Err(TaskTableError::AmbiguousRoutineSymbol(symbol.name().to_string()));
            }
        }
    }

    raw_tasks
        .into_iter()
        .map(|raw| {
            let address = routine_map
                .get(raw.routine_name.as_str())
                .copied()
                .ok_or_else(|| TaskTableError::UnresolvedRoutine(raw.routine_name.clone()))?;
            let mut task = Task::new(raw.name, raw.routine_name, raw.stack_size);
            task.set_routine_address(crate::model::Address::new(address));
            Ok(task)
        })
        .collect()
}
