//! Query templates, one per tool

pub const LIST_MATCHES: &str = r#"
query ListMatches {
  matches(orderBy: [{ date: DESC }]) {
    id
    homeTeam
    awayTeam
    homeScore
    awayScore
    date
    venue
  }
}
"#;

pub const GET_MATCH: &str = r#"
query GetMatch($id: UUID!) {
  match(id: $id) {
    id
    homeTeam
    awayTeam
    homeScore
    awayScore
    date
    venue
    players: matchPlayers_on_match {
      team
      player {
        id
        name
        position
      }
    }
    events: events_on_match(orderBy: [{ minute: ASC }]) {
      id
      type
      minute
      description
      player {
        id
        name
      }
    }
  }
}
"#;

pub const LIST_PLAYERS: &str = r#"
query ListPlayers {
  players(orderBy: [{ name: ASC }]) {
    id
    name
    team
    position
  }
}
"#;

pub const GET_PLAYER: &str = r#"
query GetPlayer($id: UUID!) {
  player(id: $id) {
    id
    name
    team
    position
    matches: matchPlayers_on_player {
      match {
        id
        homeTeam
        awayTeam
        homeScore
        awayScore
        date
      }
    }
  }
}
"#;

pub const LIST_EVENTS_BY_TYPE: &str = r#"
query ListEventsByType($eventType: String!) {
  events(where: { type: { eq: $eventType } }, orderBy: [{ minute: ASC }]) {
    id
    type
    minute
    description
    match {
      id
      homeTeam
      awayTeam
      date
    }
    player {
      id
      name
    }
  }
}
"#;

pub const LIST_EVENTS_BY_PLAYER: &str = r#"
query ListEventsByPlayer($playerId: UUID!) {
  events(where: { player: { id: { eq: $playerId } } }, orderBy: [{ minute: ASC }]) {
    id
    type
    minute
    description
    match {
      id
      homeTeam
      awayTeam
      date
    }
  }
}
"#;
