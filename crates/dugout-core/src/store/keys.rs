/// The collections the league store knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKey {
    Teams,
    Coaches,
    Players,
    Schedule,
    Locations,
    Categories,
    Statuses,
    Inventory,
    Concessions,
    EventUsage,
    EventRequests,
    ActivityLog,
}

impl CollectionKey {
    pub const ALL: [CollectionKey; 12] = [
        CollectionKey::Teams,
        CollectionKey::Coaches,
        CollectionKey::Players,
        CollectionKey::Schedule,
        CollectionKey::Locations,
        CollectionKey::Categories,
        CollectionKey::Statuses,
        CollectionKey::Inventory,
        CollectionKey::Concessions,
        CollectionKey::EventUsage,
        CollectionKey::EventRequests,
        CollectionKey::ActivityLog,
    ];

    /// Storage name, before namespacing.
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKey::Teams => "teams",
            CollectionKey::Coaches => "coaches",
            CollectionKey::Players => "players",
            CollectionKey::Schedule => "schedule",
            CollectionKey::Locations => "locations",
            CollectionKey::Categories => "categories",
            CollectionKey::Statuses => "statuses",
            CollectionKey::Inventory => "inventory",
            CollectionKey::Concessions => "concessions",
            CollectionKey::EventUsage => "eventUsage",
            CollectionKey::EventRequests => "eventRequests",
            CollectionKey::ActivityLog => "activityLog",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|key| key.as_str() == name)
    }
}

impl AsRef<str> for CollectionKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
