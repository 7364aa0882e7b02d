/// Sedex-style participant identifier of the sending office.
/// Example: `4-143849-0`
pub type SenderId = String;
/// Participant identifier of a configured recipient.
/// Example: `4-143849-0`
pub type RecipientId = String;
/// Unique token linking a dispatched file to its eventual receipt.
/// Example: `4-143849-0-20191112-1334-51-935`
pub type CorrelationId = String;
/// Wall-clock sequence token component of a correlation id.
/// Example: `20191112-1334-51-935`
pub type SequenceToken = String;
/// Status text extracted from a receipt document.
/// Example: `Message successfully transmitted`
pub type StatusText = String;
/// Qualified tag name of a receipt document element.
/// Examples: `messageId`, `sdx:messageId`
pub type TagName = String;
/// Concatenated text content of a receipt document element.
/// Example: `4-143849-0-20191112-1334-51-935-E00`
pub type ElementText = String;
