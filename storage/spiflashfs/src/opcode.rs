/// A request byte sent by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Request the current device status
    GetStatus = 0x73,
    /// Erase the flash chip
    EraseChip = 0x65,
    /// Write an empty filesystem to the erased chip
    InitFilesystem = 0x69,
    /// Allocate a new file, followed by its length and contents
    CreateFile = 0x66,
}

impl Command {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub(crate) const fn name(self) -> &'static str {
        match self {
            Command::GetStatus => "get status",
            Command::EraseChip => "erase chip",
            Command::InitFilesystem => "initialize filesystem",
            Command::CreateFile => "create file",
        }
    }
}
