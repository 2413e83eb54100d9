//! Wire types shared between the ogon Session Manager and the RDP frontend.
//!
//! This crate owns two things: the ICP frame codec (§6 of the Session
//! Manager spec) and the protobuf message schemas carried as ICP payloads.
//! Nothing here talks to sockets — that's `smgr::rpc::icp`.

pub mod admin;
pub mod call_type;
pub mod frame;

include!(concat!(env!("OUT_DIR"), "/ogon.icp.rs"));
