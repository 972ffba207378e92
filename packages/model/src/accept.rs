//! Drop legality: how welcome a dragged container is at a candidate
//! location.

use crate::token::*;
use crate::tree::Tree;
use std::fmt;

/// Ordered from least to most welcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AcceptLevel {
    Forbid,
    Discourage,
    Normal,
    Encourage,
}

impl AcceptLevel {
    /// Levels a drop highlight may land on
    pub fn is_droppable(self) -> bool {
        self >= AcceptLevel::Normal
    }
}

impl fmt::Display for AcceptLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AcceptLevel::Forbid => "FORBIDDEN",
            AcceptLevel::Discourage => "DISCOURAGED",
            AcceptLevel::Normal => "NORMAL",
            AcceptLevel::Encourage => "ENCOURAGED",
        })
    }
}

impl Tree {
    /// Classify dropping `dragged` into `candidate`.
    ///
    /// Sockets consult the dragged block's `socket_level` and then their own
    /// `accepts` policy. Statement positions (indents, segments and blocks
    /// sitting directly in either) only look at `socket_level`.
    pub fn get_accept_level(&self, dragged: ContainerId, candidate: ContainerId) -> AcceptLevel {
        if self.is_within(NodeRef::Container(candidate), dragged) {
            return AcceptLevel::Forbid;
        }

        let dragged_kind = self.container_kind(dragged);
        let level = self
            .container(dragged)
            .as_block()
            .map(|block| block.socket_level)
            .unwrap_or_default();

        match self.container(candidate).data() {
            ContainerData::Socket(socket) => {
                if dragged_kind == ContainerKind::Segment || socket.accepts == AcceptPolicy::Forbid {
                    return AcceptLevel::Forbid;
                }
                let base = match level {
                    SocketLevel::BlockOnly => AcceptLevel::Forbid,
                    SocketLevel::MostlyBlock => AcceptLevel::Discourage,
                    SocketLevel::AnyDrop | SocketLevel::MostlyValue => AcceptLevel::Normal,
                    SocketLevel::ValueOnly => AcceptLevel::Encourage,
                };
                match (base, socket.accepts) {
                    (AcceptLevel::Forbid, _) => AcceptLevel::Forbid,
                    (_, AcceptPolicy::EncourageAll) => AcceptLevel::Encourage,
                    (_, AcceptPolicy::DiscourageAll) => AcceptLevel::Discourage,
                    (level, _) => level,
                }
            }
            ContainerData::Indent(_) | ContainerData::Segment(_) => statement_level(level),
            ContainerData::Block(_) => {
                let in_statement_position = match self.container(candidate).parent() {
                    None => true,
                    Some(parent) => matches!(
                        self.container_kind(parent),
                        ContainerKind::Indent | ContainerKind::Segment
                    ),
                };
                if in_statement_position {
                    statement_level(level)
                } else {
                    AcceptLevel::Forbid
                }
            }
        }
    }
}

fn statement_level(level: SocketLevel) -> AcceptLevel {
    match level {
        SocketLevel::ValueOnly => AcceptLevel::Forbid,
        SocketLevel::MostlyValue => AcceptLevel::Discourage,
        SocketLevel::BlockOnly => AcceptLevel::Encourage,
        SocketLevel::AnyDrop | SocketLevel::MostlyBlock => AcceptLevel::Normal,
    }
}
