//! ONC-RPC version 2 (RFC 5531) client side, TCP only.

pub const RPCVERSION:u32 = 2;

// msg_type
pub const CALL:i32  = 0;
pub const REPLY:i32 = 1;

// reply_stat
pub const MSG_ACCEPTED:i32 = 0;
pub const MSG_DENIED:i32   = 1;

// reject_stat
pub const RPC_MISMATCH:i32 = 0;
pub const AUTH_ERROR:i32   = 1;

// accept_stat
pub const SUCCESS:i32       = 0;      // RPC executed successfully
pub const PROG_UNAVAIL:i32  = 1;      // remote hasn't exported program
pub const PROG_MISMATCH:i32 = 2;      // remote can't support version #
pub const PROC_UNAVAIL:i32  = 3;      // program can't support procedure
pub const GARBAGE_ARGS:i32  = 4;      // procedure can't decode params

// Instruments don't check credentials, so every call goes out as AUTH_NONE
pub const AUTH_NULL:i32 = 0;

pub const IPPROTO_TCP:u32 = 6;
pub const IPPROTO_UDP:u32 = 17;

// Record marking: high bit of the 4-byte fragment header flags the last fragment of a record
pub const LAST_FRAGMENT:u32 = 0x8000_0000;

pub mod xdr_unpack;
pub mod xdr_pack;

pub mod port_mapping;

pub mod tcp_clients;
