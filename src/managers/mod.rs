// LinkVault state managers
// The storage manager walks the provider chain for save, load, and clear.

pub mod storage_manager;
