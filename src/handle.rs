#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Handle(pub u64);

impl Handle {
    pub fn empty() -> Self {
        Handle(0)
    }
    pub fn next_handle_value(self) -> Self {
        Handle(self.0 + 1)
    }
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
    pub fn as_string(self) -> String {
        format!("{:X}", self.0)
    }
    /// Parses a handle from its hex string form, e.g. `"1AF"`.
    pub fn from_string(val: &str) -> Option<Self> {
        u64::from_str_radix(val.trim(), 16).ok().map(Handle)
    }
}
