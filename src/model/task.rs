// Tue Jan 13 2026 - Alex

use crate::model::Address;

/// A schedulable task with a declared stack budget and a named entry routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    name: String,
    routine_name: String,
    declared_stack_size: u32,
    routine_address: Option<Address>,
}

impl Task {
    pub fn new(name: String, routine_name: String, declared_stack_size: u32) -> Self {
        Self {
            name,
            routine_name,
            declared_stack_size,
            routine_address: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn routine_name(&self) -> &str {
        &self.routine_name
    }

    pub fn declared_stack_size(&self) -> u32 {
        self.declared_stack_size
    }

    pub fn routine_address(&self) -> Option<Address> {
        self.routine_address
    }

    pub fn set_routine_address(&mut self, address: Address) {
        self.routine_address = Some(address);
    }
}

/// Which of the two task tables (RO/RW image sections) to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSection {
    Ro,
    Rw,
}

impl std::str::FromStr for TaskSection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "RO" => Ok(TaskSection::Ro),
            "RW" => Ok(TaskSection::Rw),
            other => Err(format!("unknown section {other:?}, expected RO or RW")),
        }
    }
}

impl std::fmt::Display for TaskSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TaskSection::Ro => "RO",
            TaskSection::Rw => "RW",
        })
    }
}
