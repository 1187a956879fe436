// Tue Jan 13 2026 - Alex

use crate::model::Address;

/// A static callsite discovered inside a function body.
///
/// At least one of `site_address` or `target_address` is always present:
/// an annotation-added edge has no site (it isn't a real instruction), and
/// an indirect call has no known target until annotations resolve it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callsite {
    site_address: Option<Address>,
    target_address: Option<Address>,
    is_tail: bool,
    callee_ref: Option<Address>,
}

impl Callsite {
    pub fn new(site_address: Option<Address>, target_address: Option<Address>, is_tail: bool) -> Self {
        assert!(
            site_address.is_some() || target_address.is_some(),
            "a callsite must carry a site address, a target address, or both"
        );
        Self {
            site_address,
            target_address,
            is_tail,
            callee_ref: None,
        }
    }

    pub fn site_address(&self) -> Option<Address> {
        self.site_address
    }

    pub fn target_address(&self) -> Option<Address> {
        self.target_address
    }

    pub fn is_tail(&self) -> bool {
        self.is_tail
    }

    pub fn is_indirect(&self) -> bool {
        self.target_address.is_none()
    }

    pub fn callee_ref(&self) -> Option<Address> {
        self.callee_ref
    }

    pub fn set_callee_ref(&mut self, callee: Option<Address>) {
        self.callee_ref = callee;
    }
}

/// A disassembled function: its own stack frame, its outgoing callsites, and
/// (once §4.6 has run) the fields of the max-stack analysis.
#[derive(Debug, Clone)]
pub struct Function {
    address: Address,
    name: String,
    stack_frame: u64,
    callsites: Vec<Callsite>,
}

impl Function {
    pub fn new(address: Address, name: String, stack_frame: u64, callsites: Vec<Callsite>) -> Self {
        Self { address, name, stack_frame, callsites }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stack_frame(&self) -> u64 {
        self.stack_frame
    }

    pub fn callsites(&self) -> &[Callsite] {
        &self.callsites
    }

    pub fn callsites_mut(&mut self) -> &mut Vec<Callsite> {
        &mut self.callsites
    }
}
