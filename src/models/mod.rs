// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AccountSummary, ChatMessage, ChatRole, Cleanliness, Coordinates, GenderPreference, GeometryType,
    Listing, ListingDetail, Location, MatchCandidate, MissingPreferenceFields, Model3D, ModelFormat,
    OwnerSummary, Photo, PreferencesUpdate, RoommateMatch, RoommatePreference, SearchCriteria,
    SleepSchedule, StudyHabits, User, UserSummary, Visitors,
};
pub use requests::{
    ChatRequest, ForgotPasswordRequest, ListingForm, ListingQueryParams, ListingUpdate, LoginRequest,
    NearPath, RegisterRequest, ResetPasswordRequest, SearchDormsRequest, UpdateUserRequest,
};
pub use responses::{
    AiSearchResult, ApiResponse, AuthPayload, ChatReply, ErrorResponse, HealthResponse, ListingPage,
};
