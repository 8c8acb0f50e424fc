mod common;
mod escalation;
mod routing;
