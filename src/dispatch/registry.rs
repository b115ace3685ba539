//! The closed set of callable methods.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    OnlineScore,
    ClientsInterests,
}

impl Method {
    pub const ALL: [Method; 2] = [Method::OnlineScore, Method::ClientsInterests];

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Method::OnlineScore => "online_score",
            Method::ClientsInterests => "clients_interests",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
