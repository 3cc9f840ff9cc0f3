//! Compile-time capacity limits.
//!
//! Every buffer in the stack is fixed-size and embedded in its containing
//! record, so these constants bound the memory footprint of the whole
//! stack. Adjust them to the device class before building.

/// Maximum number of components per name.
pub const NAME_COMPONENTS_MAX: usize = 10;

/// Maximum payload bytes of a single name component.
pub const NAME_COMPONENT_BUFFER_SIZE: usize = 36;

/// Maximum content bytes of a Data packet.
pub const CONTENT_BUFFER_SIZE: usize = 256;

/// Maximum signature bytes. Must be at least the largest ASN.1-encoded
/// ECDSA P-256 signature (72 bytes).
pub const SIGNATURE_BUFFER_SIZE: usize = 128;

/// AES block size in bytes. Fixed by the cipher.
pub const AES_BLOCK_SIZE: usize = 16;

/// Number of callback slots in a direct application face.
pub const FACE_CB_TABLE_SIZE: usize = 8;
