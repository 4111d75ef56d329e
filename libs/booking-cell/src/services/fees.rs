// libs/booking-cell/src/services/fees.rs
//
// Fee split policy. Invoked once, at creation; fees are frozen on the
// booking afterwards and status transitions never touch them.

use directory_cell::FeeConfig;
use shared_models::BookedBy;

use crate::models::FeeBreakdown;

/// Final split for a booking. A channel-partner booking earns the
/// configured partner fee out of the platform's commission, clamped at
/// zero; the doctor and dispensary shares are never reduced, and the
/// patient's total never grows. `total_fee` is recomputed here
/// regardless of anything a caller supplied.
pub fn compute(config: &FeeConfig, booked_by: BookedBy) -> FeeBreakdown {
    let (channel_partner_fee, booking_commission) =
        if booked_by == BookedBy::ChannelPartner && config.channel_partner_fee > 0.0 {
            (
                config.channel_partner_fee,
                (config.booking_commission - config.channel_partner_fee).max(0.0),
            )
        } else {
            (0.0, config.booking_commission)
        };

    FeeBreakdown {
        doctor_fee: config.doctor_fee,
        dispensary_fee: config.dispensary_fee,
        channel_partner_fee,
        booking_commission,
        total_fee: config.doctor_fee + config.dispensary_fee + channel_partner_fee + booking_commission,
    }
}
