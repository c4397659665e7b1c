//! Ring group → dialplan XML, as a pure function of preloaded inputs.
//!
//! The rendered extension has three conditions:
//!
//! 1. a destination-number gate with no actions;
//! 2. a `${call_direction}` condition that never breaks, whose actions run on
//!    inbound calls and whose anti-actions run on everything else, so the
//!    outbound caller ID is chosen per direction;
//! 3. the destination-number condition that does the work: ringback, hooks,
//!    caller-ID prefixes, then either a forward, a follow-me callback, or a
//!    strategy bridge followed by the timeout action.

use ringplan_core::{
  dialplan::Dialplan,
  domain::Domain,
  extension::{ExtensionIndex, FollowMeChains},
  ring_group::{RingGroup, RingGroupDestination, TimeoutAction},
};
use tracing::warn;

use crate::{
  error::Result,
  strategy::StrategyEngine,
  xml::{Action, Condition, DialplanXml},
};

/// Profile name passed to the switch's HTTP call-handling module.
pub const HTTAPI_PROFILE: &str = "dpbx";

/// Path under the callback base URL that serves ring-group follow-me.
pub const HTTAPI_RING_GROUP_PATH: &str = "/httapihandler/ringgroup/";

/// Hangup hook that records missed calls.
pub const MISSED_CALL_HOOK: &str = "lua eh_hangup.lua";

/// Everything a render reads. Nothing here is mutated.
#[derive(Debug, Clone, Copy)]
pub struct CompileInput<'a> {
  pub ring_group:   &'a RingGroup,
  pub domain:       &'a Domain,
  /// Supplies the root element's name, continue flag and uuid.
  pub dialplan:     &'a Dialplan,
  /// Members in ring order. Only read when the group bridges locally.
  pub destinations: &'a [RingGroupDestination],
  pub index:        &'a ExtensionIndex,
  pub chains:       &'a FollowMeChains,
  /// Base URL of the follow-me call-handling service.
  pub httapi_url:   &'a str,
}

/// Build the dialplan tree for `input`.
pub fn build(input: &CompileInput<'_>) -> Result<DialplanXml> {
  let rg = input.ring_group;
  let destination_match = format!("^{}$", rg.extension);

  Ok(DialplanXml {
    name:        input.dialplan.name.clone(),
    dp_continue: input.dialplan.dp_continue,
    uuid:        input.dialplan.id,
    conditions:  vec![
      Condition::new("destination_number", destination_match.clone()),
      caller_id_condition(rg),
      execution_condition(input, destination_match)?,
    ],
  })
}

/// Render `input` to dialplan XML text.
pub fn render(input: &CompileInput<'_>) -> Result<String> {
  build(input)?.to_xml()
}

fn caller_id_condition(rg: &RingGroup) -> Condition {
  let mut cond =
    Condition::new("${call_direction}", "^inbound$").with_break("never");

  cond
    .action(Action::set(
      "rg_ob_caller_id_name",
      rg.caller_id_name().unwrap_or("${caller_id_name}"),
    ))
    .action(Action::set(
      "rg_ob_caller_id_number",
      rg.caller_id_number().unwrap_or("${caller_id_number}"),
    ))
    .anti_action(Action::set(
      "rg_ob_caller_id_name",
      rg.caller_id_name().unwrap_or("${outbound_caller_id_name}"),
    ))
    .anti_action(Action::set(
      "rg_ob_caller_id_number",
      rg.caller_id_number().unwrap_or("${outbound_caller_id_number}"),
    ));

  cond
}

fn execution_condition(
  input: &CompileInput<'_>,
  destination_match: String,
) -> Result<Condition> {
  let rg = input.ring_group;
  let mut cond = Condition::new("destination_number", destination_match);

  cond
    .action(Action::set("ring_group_uuid", rg.id).inline())
    .action(Action::set("ring_back", &rg.ringback))
    .action(Action::set("hangup_after_bridge", true));

  if let Some(app) = rg.missed_call_app() {
    cond
      .action(Action::set("missed_call_app", app))
      .action(Action::set(
        "missed_call_data",
        rg.missed_call_data.as_deref().unwrap_or_default(),
      ))
      .action(Action::set("api_hangup_hook", MISSED_CALL_HOOK));
  }

  if let Some(ring) = rg.distinctive_ring() {
    cond.action(Action::export("sip_h_Alert-Info", ring));
  }
  if let Some(prefix) = rg.cid_name_prefix() {
    cond.action(Action::set(
      "effective_caller_id_name",
      format!("{prefix}${{caller_id_name}}"),
    ));
  }
  if let Some(prefix) = rg.cid_number_prefix() {
    cond.action(Action::set(
      "effective_caller_id_number",
      format!("{prefix}${{caller_id_number}}"),
    ));
  }

  if rg.forward_enabled {
    forward_actions(&mut cond, input);
    return Ok(cond);
  }

  cond
    .action(Action::set("call_timeout", rg.call_timeout))
    .action(Action::set("continue_on_fail", true))
    .action(Action::new("ring_ready", ""));

  if let Some(greeting) = rg.greeting() {
    cond.action(Action::new("playback", greeting));
  }

  if rg.follow_me_enabled {
    cond.action(Action::new(
      "httapi",
      format!(
        "{{httapi_profile={HTTAPI_PROFILE},url={}{HTTAPI_RING_GROUP_PATH}}}",
        input.httapi_url
      ),
    ));
    return Ok(cond);
  }

  let engine = StrategyEngine::new(
    rg,
    &input.domain.name,
    input.index,
    input.chains,
  );
  cond.action(Action::raw("bridge", engine.bridge_command(input.destinations)));

  let timeout = rg.timeout_action()?;
  if TimeoutAction::is_bare(&rg.timeout_data)
    && timeout.application != TimeoutAction::HANGUP
  {
    warn!(
      ring_group = %rg.id,
      timeout_data = %rg.timeout_data,
      "timeout action has no data"
    );
  }
  cond.action(match timeout.data {
    Some(data) => Action::new(&timeout.application, data),
    None => Action::bare(&timeout.application),
  });

  Ok(cond)
}

fn forward_actions(cond: &mut Condition, input: &CompileInput<'_>) {
  let rg = input.ring_group;
  let destination = rg.forward_destination();

  cond.action(Action::set("ring_group_uuid", rg.id));

  match input.index.get(destination) {
    Some(ext) => {
      cond
        .action(Action::set("dialed_extension", destination))
        .action(Action::set("extension_uuid", ext.id))
        .action(Action::new("bridge", format!("user/{destination}")));
    }
    None => {
      cond
        .action(Action::set("toll_allow", rg.toll_allow()))
        .action(Action::set(
          "origination_caller_id_name",
          "${rg_ob_caller_id_name}",
        ))
        .action(Action::set(
          "origination_caller_id_number",
          "${rg_ob_caller_id_number}",
        ))
        .action(Action::new("bridge", format!("loopback/{destination}")));
    }
  }
}
