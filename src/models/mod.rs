mod booking;
mod event;
mod payment;
mod ticket_type;
mod user;

pub use booking::{Booking, BookingDetails, BookingStatus, CreateBooking};
pub use event::{CreateEvent, Event};
pub use payment::{CreatePayment, Payment};
pub use ticket_type::{CreateTicketType, TicketType};
pub use user::{CreateUser, User};
